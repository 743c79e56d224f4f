//! Position-Extended Forest-Ruth-Like (PEFRL) integration method

use super::{AccelerationField, Integrator};
use crate::physics::body::ThreeBodySystem;
use crate::physics::error::OrbitError;
use crate::physics::math::Scalar;

/// PEFRL integrator - a 4th order symplectic integrator
///
/// The algorithm uses a symmetric composition of position and velocity updates,
/// each applied to all three bodies before the next stage:
/// 1. x += ξ * v * dt
/// 2. v += (1-2λ)/2 * a(x) * dt
/// 3. x += χ * v * dt
/// 4. v += λ * a(x) * dt
/// 5. x += (1-2(χ+ξ)) * v * dt
/// 6. v += λ * a(x) * dt
/// 7. x += χ * v * dt
/// 8. v += (1-2λ)/2 * a(x) * dt
/// 9. x += ξ * v * dt
///
/// Because the composition is palindromic it is time-reversible, like
/// Velocity Verlet, at four force evaluations per step.
///
/// Reference: Omelyan, Mryglod, Folk (2002) "Optimized Forest-Ruth- and Suzuki-like algorithms
/// for integration of motion in many-body systems"
#[derive(Debug, Clone, Default)]
pub struct Pefrl;

impl Pefrl {
    const XI: Scalar = 0.178_617_895_844_809_1;
    const LAMBDA: Scalar = -0.212_341_831_062_605_4;
    const CHI: Scalar = -0.066_264_582_669_818_5;

    fn drift(system: &mut ThreeBodySystem, factor: Scalar) {
        for body in system.iter_mut() {
            body.position += body.velocity * factor;
        }
    }

    fn kick(
        system: &mut ThreeBodySystem,
        field: &dyn AccelerationField,
        factor: Scalar,
    ) -> Result<(), OrbitError> {
        let accels = field.accelerations(system)?;
        for (body, acceleration) in system.iter_mut().zip(accels.0) {
            body.velocity += acceleration * factor;
        }
        Ok(())
    }
}

impl Integrator for Pefrl {
    fn step(
        &self,
        system: &mut ThreeBodySystem,
        field: &dyn AccelerationField,
        dt: Scalar,
    ) -> Result<(), OrbitError> {
        const COEFF_A: Scalar = 0.5 * (1.0 - 2.0 * Pefrl::LAMBDA); // (1-2λ)/2
        const COEFF_B: Scalar = 1.0 - 2.0 * (Pefrl::CHI + Pefrl::XI); // 1-2(χ+ξ)

        Self::drift(system, Self::XI * dt);
        Self::kick(system, field, COEFF_A * dt)?;
        Self::drift(system, Self::CHI * dt);
        Self::kick(system, field, Self::LAMBDA * dt)?;
        Self::drift(system, COEFF_B * dt);
        Self::kick(system, field, Self::LAMBDA * dt)?;
        Self::drift(system, Self::CHI * dt);
        Self::kick(system, field, COEFF_A * dt)?;
        Self::drift(system, Self::XI * dt);

        Ok(())
    }

    fn convergence_order(&self) -> usize {
        4
    }

    fn name(&self) -> &'static str {
        "pefrl"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["forest_ruth"]
    }
}
