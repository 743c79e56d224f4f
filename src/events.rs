//! Centralized event definitions
//!
//! Input systems translate key presses into [`ViewerCommand`] events and the
//! orbit plugin consumes them, so neither side needs to know about the other.

use bevy::prelude::*;

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerCommand {
    /// Draw a new seed and recompute every line
    Regenerate,
    /// Show the next 3x3 block of the projection
    CycleAxis,
    /// Color by the speed of the next body
    CycleColoredBody,
    Quit,
}
