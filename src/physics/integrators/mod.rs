//! Numerical integration methods for the three-body system

use crate::physics::body::{SystemAccels, ThreeBodySystem};
use crate::physics::error::OrbitError;
use crate::physics::math::Scalar;

pub mod pefrl;
pub mod registry;
pub mod velocity_verlet;

pub use pefrl::Pefrl;
pub use registry::IntegratorRegistry;
pub use velocity_verlet::VelocityVerlet;

/// Anything that can produce per-body accelerations for a system state
pub trait AccelerationField {
    fn accelerations(&self, system: &ThreeBodySystem) -> Result<SystemAccels, OrbitError>;
}

/// Base trait for all integrators
///
/// Every integrator shipped here is time-symmetric: stepping by `dt` and then
/// by `-dt` returns to the starting state up to rounding. The orbit sampler
/// relies on this to roll back rejected steps.
pub trait Integrator: Send + Sync {
    /// Advance the whole system by one time step
    ///
    /// # Arguments
    /// * `system` - System to advance in place
    /// * `field` - Source of accelerations for intermediate states
    /// * `dt` - Time step, possibly negative
    fn step(
        &self,
        system: &mut ThreeBodySystem,
        field: &dyn AccelerationField,
        dt: Scalar,
    ) -> Result<(), OrbitError>;

    /// Order of the global error in `dt`
    fn convergence_order(&self) -> usize;

    /// Canonical name used in configuration
    fn name(&self) -> &'static str;

    /// Alternative names accepted by the registry
    fn aliases(&self) -> Vec<&'static str> {
        Vec::new()
    }
}
