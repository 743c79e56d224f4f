//! Camera plugin - Self-contained plugin pattern
//!
//! Spawns the orbit camera and re-targets it whenever a new batch replaces
//! the one on screen, so the whole set of lines stays in view.

use crate::physics::aabb3d::Aabb3d;
use crate::prelude::*;
use bevy::core_pipeline::bloom::Bloom;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy_panorbit_camera::PanOrbitCamera;
use bevy_panorbit_camera::TouchControls;
use bevy_panorbit_camera::TrackpadBehavior;

const DEFAULT_CAMERA_RADIUS: f32 = 5.0;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera);
        app.add_systems(
            Update,
            fit_camera_to_orbits.run_if(resource_exists_and_changed::<Orbits>),
        );
    }
}

/// Focus point and orbit radius that keep `bounds` in view.
///
/// Returns `None` for empty or non-finite bounds.
pub fn camera_fit(bounds: &Aabb3d, radius_multiplier: f32) -> Option<(Vec3, f32)> {
    if bounds.is_empty() {
        return None;
    }

    let center = bounds.center().as_vec3();
    let extent = bounds.size().as_vec3().length();
    if !center.is_finite() || !extent.is_finite() {
        return None;
    }

    Some((center, (extent * radius_multiplier).max(f32::EPSILON)))
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("Main Camera"),
        Camera {
            hdr: true,
            clear_color: ClearColorConfig::Custom(Color::BLACK),
            ..default()
        },
        Camera3d::default(),
        Tonemapping::TonyMcMapface,
        Bloom::NATURAL,
        Msaa::default(),
        PanOrbitCamera {
            allow_upside_down: true,
            focus: Vec3::ZERO,
            pan_smoothness: 0.0,
            radius: Some(DEFAULT_CAMERA_RADIUS),
            touch_controls: TouchControls::OneFingerOrbit,
            trackpad_behavior: TrackpadBehavior::blender_default(),
            trackpad_pinch_to_zoom_enabled: true,
            ..default()
        },
    ));
}

fn fit_camera_to_orbits(
    orbits: Res<Orbits>,
    config: Res<SimulationConfig>,
    mut cameras: Query<&mut PanOrbitCamera>,
) {
    let Some(batch) = &orbits.batch else {
        return;
    };
    let Some((focus, radius)) =
        camera_fit(&batch.bounds(), config.rendering.camera_radius_multiplier)
    else {
        return;
    };

    for mut camera in &mut cameras {
        camera.target_focus = focus;
        camera.target_radius = radius;
    }
    debug!("Camera focus {focus}, radius {radius}");
}
