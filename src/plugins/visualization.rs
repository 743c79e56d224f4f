//! Visualization plugin - Self-contained plugin pattern
//!
//! Draws every line of the current batch as a gradient line strip, plus the
//! three columns of the selected projection block as arrows from the origin.

use crate::physics::aabb3d::Aabb3d;
use crate::prelude::*;
use crate::utils::color::to_color;
use bevy::color::palettes::css;

/// Arrow length as a fraction of the largest extent of the batch
const AXIS_LENGTH_FRACTION: f32 = 0.25;
const AXIS_COLORS: [Srgba; 3] = [css::TOMATO, css::LIME, css::DODGER_BLUE];

pub struct VisualizationPlugin;

impl Plugin for VisualizationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                draw_orbits,
                draw_projection_axes.run_if(|settings: Res<DisplaySettings>| settings.show_axes),
                draw_bounds.run_if(|settings: Res<DisplaySettings>| settings.show_bounds),
            ),
        );
    }
}

/// End points of the three axis arrows for a projection block
pub fn axis_arrows(axes: Mat3, bounds: &Aabb3d) -> [Vec3; 3] {
    let length = if bounds.is_empty() {
        1.0
    } else {
        (bounds.size().max_element() as f32 * AXIS_LENGTH_FRACTION).max(f32::EPSILON)
    };

    [axes.x_axis * length, axes.y_axis * length, axes.z_axis * length]
}

fn draw_orbits(mut gizmos: Gizmos, orbits: Res<Orbits>) {
    let Some(batch) = &orbits.batch else {
        return;
    };

    for orbit in &batch.orbits {
        gizmos.linestrip_gradient(
            orbit
                .points
                .iter()
                .copied()
                .zip(orbit.colors.iter().map(|&rgb| to_color(rgb))),
        );
    }
}

fn draw_projection_axes(
    mut gizmos: Gizmos,
    orbits: Res<Orbits>,
    settings: Res<DisplaySettings>,
) {
    let Some(batch) = &orbits.batch else {
        return;
    };

    let ends = axis_arrows(batch.projection_axes(settings.axis), &batch.bounds());
    for (end, color) in ends.into_iter().zip(AXIS_COLORS) {
        gizmos.arrow(Vec3::ZERO, end, color);
    }
}

fn draw_bounds(mut gizmos: Gizmos, orbits: Res<Orbits>) {
    let Some(batch) = &orbits.batch else {
        return;
    };

    let bounds = batch.bounds();
    if bounds.is_empty() {
        return;
    }

    gizmos.cuboid(
        Transform::from_translation(bounds.center().as_vec3())
            .with_scale(bounds.size().as_vec3()),
        css::DIM_GRAY,
    );
}
