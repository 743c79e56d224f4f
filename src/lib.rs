//! PhaseViz library
//!
//! Three-body orbits sampled from 18-dimensional phase space and projected
//! to 3D. The core lives in [`physics`]; the Bevy plugins in [`plugins`]
//! only display or report what it produces.

pub mod cli;
pub mod config;
pub mod events;
pub mod physics;
pub mod plugins;
pub mod prelude;
pub mod resources;
pub mod utils;

// Test utilities are public for integration tests
pub mod test_utils;
