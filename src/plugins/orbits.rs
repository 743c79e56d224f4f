//! Orbits plugin - Self-contained plugin pattern
//!
//! Owns the on-screen [`OrbitBatch`]: computes it at startup and recomputes it
//! in response to [`ViewerCommand`] events. Requires a [`Generator`] resource.

use crate::physics::body::BODY_COUNT;
use crate::prelude::*;
use crate::utils::color::ColorMode;

pub struct OrbitsPlugin;

impl Plugin for OrbitsPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<SimulationConfig>()
            .cloned()
            .unwrap_or_default();

        app.insert_resource(DisplaySettings::from_config(&config));
        app.init_resource::<Orbits>();
        app.init_resource::<GenerationCancel>();
        app.add_event::<ViewerCommand>();

        app.add_systems(Startup, generate_initial_orbits);
        app.add_systems(Update, handle_viewer_commands);
    }
}

/// Runs one batch with the generator's current seed and logs the outcome
pub fn regenerate(
    generator: &OrbitGenerator,
    cancel: &CancellationToken,
) -> Option<OrbitBatch> {
    match generator.generate_data(cancel) {
        Ok(batch) => {
            info!(
                "Generated {} lines ({} skipped) with seed {}: {} vertices from {} steps",
                batch.orbits.len(),
                batch.skipped,
                batch.seed,
                batch.total_vertices(),
                batch.total_steps()
            );
            Some(batch)
        }
        Err(e) => {
            error!("Orbit generation with seed {} failed: {}", generator.seed(), e);
            None
        }
    }
}

fn generate_initial_orbits(
    generator: Res<Generator>,
    cancel: Res<GenerationCancel>,
    mut orbits: ResMut<Orbits>,
) {
    if let Some(batch) = regenerate(&generator, &cancel) {
        orbits.replace(batch);
    }
}

fn handle_viewer_commands(
    mut commands: EventReader<ViewerCommand>,
    mut generator: ResMut<Generator>,
    mut rng: ResMut<SharedRng>,
    mut orbits: ResMut<Orbits>,
    mut settings: ResMut<DisplaySettings>,
    cancel: Res<GenerationCancel>,
    mut exit: EventWriter<AppExit>,
) {
    for command in commands.read() {
        match command {
            ViewerCommand::Regenerate => {
                let seed = rng.random();
                generator.set_seed(seed);
                if let Some(batch) = regenerate(&generator, &cancel) {
                    orbits.replace(batch);
                }
            }
            ViewerCommand::CycleAxis => {
                settings.axis = settings.axis.next();
                info!("Showing projection axes for {}", settings.axis);
            }
            ViewerCommand::CycleColoredBody => {
                settings.colored_body = (settings.colored_body + 1) % BODY_COUNT;
                generator.config_mut().rendering.colored_body = settings.colored_body;
                info!("Coloring by speed of body {}", settings.colored_body);

                if generator.config().rendering.color_mode == ColorMode::BodySpeed {
                    if let Some(batch) = regenerate(&generator, &cancel) {
                        orbits.replace(batch);
                    }
                }
            }
            ViewerCommand::Quit => {
                cancel.cancel();
                exit.write(AppExit::Success);
            }
        }
    }
}
