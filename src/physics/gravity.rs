//! Newtonian gravity between three unit masses

use crate::physics::body::{BODY_COUNT, SystemAccels, ThreeBodySystem};
use crate::physics::error::OrbitError;
use crate::physics::integrators::AccelerationField;
use crate::physics::math::{Scalar, Vector};
use serde::{Deserialize, Serialize};

/// What to do when two bodies come closer than the solver's minimum distance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Use the minimum distance in the denominator. Accelerations stay finite.
    #[default]
    Clamp,
    /// Fail the step with [`OrbitError::DegenerateGeometry`]
    Reject,
}

/// Pairwise gravitational accelerations with unit masses and G = 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravitySolver {
    pub min_distance: Scalar,
    pub policy: DegeneratePolicy,
}

impl Default for GravitySolver {
    fn default() -> Self {
        Self {
            min_distance: 1e-3,
            policy: DegeneratePolicy::Clamp,
        }
    }
}

impl GravitySolver {
    pub fn new(min_distance: Scalar, policy: DegeneratePolicy) -> Self {
        Self {
            min_distance: min_distance.max(0.0),
            policy,
        }
    }

    /// Acceleration on every body from the other two.
    ///
    /// Each pair contributes `-d / |d|^3` to the first body and `+d / |d|^3`
    /// to the second, where `d` points from the second body to the first, so
    /// the contributions cancel exactly.
    pub fn compute_accelerations(
        &self,
        system: &ThreeBodySystem,
    ) -> Result<SystemAccels, OrbitError> {
        let mut accels = SystemAccels::ZERO;

        for i in 0..BODY_COUNT {
            for j in (i + 1)..BODY_COUNT {
                let displacement = system[i].position - system[j].position;
                let contribution = self.pair_term(displacement, (i, j))?;
                accels[i] -= contribution;
                accels[j] += contribution;
            }
        }

        Ok(accels)
    }

    fn pair_term(
        &self,
        displacement: Vector,
        bodies: (usize, usize),
    ) -> Result<Vector, OrbitError> {
        let distance = displacement.length();

        let distance = match self.policy {
            DegeneratePolicy::Reject if distance == 0.0 || distance < self.min_distance => {
                return Err(OrbitError::DegenerateGeometry { bodies, distance });
            }
            DegeneratePolicy::Reject => distance,
            DegeneratePolicy::Clamp => distance.max(self.min_distance),
        };

        if distance == 0.0 {
            return Ok(Vector::ZERO);
        }

        Ok(displacement / (distance * distance * distance))
    }
}

impl AccelerationField for GravitySolver {
    fn accelerations(&self, system: &ThreeBodySystem) -> Result<SystemAccels, OrbitError> {
        self.compute_accelerations(system)
    }
}
