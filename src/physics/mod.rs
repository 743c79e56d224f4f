//! Three-body dynamics, phase-space projection and orbit sampling

pub mod aabb3d;
pub mod body;
pub mod error;
pub mod generator;
pub mod gravity;
pub mod integrators;
pub mod math;
pub mod projection;
pub mod sampler;
