//! Headless plugin
//!
//! Generates one batch at startup, logs per-line sampler statistics and
//! requests exit. Used with `MinimalPlugins` for runs without a window.

use crate::prelude::*;

pub struct HeadlessPlugin;

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GenerationCancel>();
        app.add_systems(Startup, run_headless);
    }
}

/// Summary of a headless run, kept around for callers that inspect the world
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct HeadlessReport {
    pub seed: u64,
    pub lines: usize,
    pub skipped: usize,
    pub vertices: usize,
    pub steps: u64,
}

impl HeadlessReport {
    pub fn from_batch(batch: &OrbitBatch) -> Self {
        Self {
            seed: batch.seed,
            lines: batch.orbits.len(),
            skipped: batch.skipped,
            vertices: batch.total_vertices(),
            steps: batch.total_steps(),
        }
    }
}

fn run_headless(
    mut commands: Commands,
    generator: Res<Generator>,
    cancel: Res<GenerationCancel>,
    mut exit: EventWriter<AppExit>,
) {
    info!(
        "Generating {} lines of {} samples with {}",
        generator.config().generation.line_count,
        generator.config().generation.sample_count,
        generator.integrator().name()
    );

    let batch = match generator.generate_data(&cancel) {
        Ok(batch) => batch,
        Err(e) => {
            error!("Orbit generation failed: {e}");
            exit.write(AppExit::error());
            return;
        }
    };

    for (index, orbit) in batch.orbits.iter().enumerate() {
        let stats = orbit.stats;
        info!(
            "Line {index}: {} vertices, {} steps, {} rejections, {} forced, final dt {:e}, {:.2?}",
            orbit.len(),
            stats.steps,
            stats.rejections,
            stats.forced_acceptances,
            stats.final_step,
            stats.elapsed
        );
        info!(
            "Line {index} bounds: {} .. {}",
            orbit.min_corner(),
            orbit.max_corner()
        );
    }

    let report = HeadlessReport::from_batch(&batch);
    if report.skipped > 0 {
        warn!("{} of {} lines were skipped", report.skipped, report.skipped + report.lines);
    }
    info!(
        "Seed {}: {} vertices from {} steps",
        report.seed, report.vertices, report.steps
    );

    commands.insert_resource(report);
    exit.write(AppExit::Success);
}
