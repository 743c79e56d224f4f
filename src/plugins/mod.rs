//! Bevy plugins for the viewer and the headless runner

pub mod camera;
pub mod controls;
pub mod headless;
pub mod orbits;
pub mod visualization;
