//! Velocity Verlet integration method

use super::{AccelerationField, Integrator};
use crate::physics::body::ThreeBodySystem;
use crate::physics::error::OrbitError;
use crate::physics::math::Scalar;

/// Velocity Verlet integrator
///
/// A second-order symplectic predictor-corrector. Accelerations are evaluated
/// before and after the position update, and the velocity update uses their
/// average:
///
/// ```text
/// a_old    = a(x(t))
/// x(t+dt)  = x(t) + dt * (v(t) + dt/2 * a_old)
/// a_new    = a(x(t+dt))
/// v(t+dt)  = v(t) + dt/2 * (a_old + a_new)
/// ```
///
/// The scheme is time-reversible, so a step with `-dt` undoes a step with `dt`.
#[derive(Debug, Clone, Default)]
pub struct VelocityVerlet;

impl Integrator for VelocityVerlet {
    fn step(
        &self,
        system: &mut ThreeBodySystem,
        field: &dyn AccelerationField,
        dt: Scalar,
    ) -> Result<(), OrbitError> {
        let half_dt = dt / 2.0;

        let old_accels = field.accelerations(system)?;
        for (body, acceleration) in system.iter_mut().zip(old_accels.0) {
            body.position += dt * (body.velocity + half_dt * acceleration);
        }

        let new_accels = field.accelerations(system)?;
        for (i, body) in system.iter_mut().enumerate() {
            body.velocity += half_dt * (old_accels[i] + new_accels[i]);
        }

        Ok(())
    }

    fn convergence_order(&self) -> usize {
        2
    }

    fn name(&self) -> &'static str {
        "velocity_verlet"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["verlet"]
    }
}
