//! Errors raised while integrating and sampling orbits

use crate::physics::math::Scalar;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum OrbitError {
    /// Two bodies came closer than the solver's minimum distance under the
    /// rejecting policy
    DegenerateGeometry {
        bodies: (usize, usize),
        distance: Scalar,
    },
    /// The projected state stopped being finite
    NonFinite { step: u64 },
    /// The sampler ran out of raw integration steps before emitting every vertex
    StepBudgetExhausted { steps: u64, emitted: usize },
    /// Generation was cancelled before the batch finished
    Cancelled,
}

impl OrbitError {
    /// Whether a batch should skip the failing line and keep going
    pub fn is_line_local(&self) -> bool {
        !matches!(self, OrbitError::Cancelled)
    }
}

impl fmt::Display for OrbitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrbitError::DegenerateGeometry { bodies, distance } => write!(
                f,
                "bodies {} and {} are {distance:e} apart, below the minimum distance",
                bodies.0, bodies.1
            ),
            OrbitError::NonFinite { step } => {
                write!(f, "projected state became non-finite at step {step}")
            }
            OrbitError::StepBudgetExhausted { steps, emitted } => write!(
                f,
                "step budget of {steps} exhausted after emitting {emitted} vertices"
            ),
            OrbitError::Cancelled => write!(f, "orbit generation was cancelled"),
        }
    }
}

impl std::error::Error for OrbitError {}
