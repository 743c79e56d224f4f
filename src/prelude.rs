//! PhaseViz prelude module
//!
//! This module re-exports the most commonly used types, traits, and functions
//! across the application to reduce import boilerplate.

// External crate re-exports
pub use bevy::prelude::*;
pub use rand::Rng;

// Internal re-exports - Config
pub use crate::config::SimulationConfig;

// Internal re-exports - Events
pub use crate::events::ViewerCommand;

// Internal re-exports - Resources
pub use crate::resources::{DisplaySettings, GenerationCancel, Generator, Orbits, SharedRng};

// Internal re-exports - Physics
pub use crate::physics::generator::{CancellationToken, OrbitBatch, OrbitGenerator};
pub use crate::physics::math::{Scalar, Vector};
pub use crate::physics::projection::Axis;
