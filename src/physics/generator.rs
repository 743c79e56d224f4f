//! Batch generation of orbit lines under one shared projection

use crate::config::{GenerationConfig, SimulationConfig};
use crate::physics::aabb3d::Aabb3d;
use crate::physics::body::{Body, ThreeBodySystem};
use crate::physics::error::OrbitError;
use crate::physics::integrators::{Integrator, IntegratorRegistry};
use crate::physics::math::{DisplayMatrix, random_vector};
use crate::physics::projection::{Axis, Projection};
use crate::physics::sampler::{Orbit, OrbitSampler};
use crate::utils::color::random_line_color;
use bevy::log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag shared between a batch and its owner
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Derives the seed of one line from the batch seed (SplitMix64 finalizer).
pub fn line_seed(master: u64, index: usize) -> u64 {
    let step = (index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut z = master.wrapping_add(step);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Draws a near-collinear starting configuration.
///
/// Bodies start inside a small cube around the origin, are shifted so body 0
/// sits exactly at the origin, and bodies 1 and 2 are then pulled out along y.
pub fn random_system<R: Rng>(rng: &mut R, config: &GenerationConfig) -> ThreeBodySystem {
    let mut bodies: [Body; 3] = std::array::from_fn(|_| {
        let mut position = random_vector(rng, config.position_radius);
        if config.planar {
            position.z = 0.0;
        }
        Body::new(position, random_vector(rng, config.initial_speed))
    });

    let origin = bodies[0].position;
    for body in &mut bodies {
        body.position -= origin;
    }

    bodies[1].position.y = config.body1_offset_y;
    bodies[2].position.y = config.body2_offset_y;

    ThreeBodySystem::new(bodies)
}

/// Every line of one generation run, in line-index order
#[derive(Debug, Clone)]
pub struct OrbitBatch {
    pub orbits: Vec<Orbit>,
    pub projection: Projection,
    pub seed: u64,
    /// Lines dropped after a line-local error
    pub skipped: usize,
}

impl OrbitBatch {
    pub fn bounds(&self) -> Aabb3d {
        self.orbits
            .iter()
            .fold(Aabb3d::EMPTY, |bounds, orbit| bounds.union(orbit.bounds))
    }

    pub fn total_vertices(&self) -> usize {
        self.orbits.iter().map(Orbit::len).sum()
    }

    pub fn total_steps(&self) -> u64 {
        self.orbits.iter().map(|orbit| orbit.stats.steps).sum()
    }

    pub fn projection_axes(&self, axis: Axis) -> DisplayMatrix {
        self.projection.projection_axes(axis)
    }
}

/// Owns everything needed to turn a seed into an [`OrbitBatch`]
pub struct OrbitGenerator {
    config: SimulationConfig,
    integrator: Box<dyn Integrator>,
    seed: u64,
}

impl OrbitGenerator {
    /// Resolves the configured integrator and master seed.
    ///
    /// Without a configured seed one is drawn from entropy and logged so the
    /// run can be reproduced.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, String> {
        let integrator = IntegratorRegistry::new().create(&config.physics.integrator)?;
        let seed = config.generation.seed.unwrap_or_else(|| {
            let seed = rand::rng().random();
            info!("No seed configured, using {seed}");
            seed
        });

        Ok(Self::new(config.clone(), integrator, seed))
    }

    pub fn new(config: SimulationConfig, integrator: Box<dyn Integrator>, seed: u64) -> Self {
        Self {
            config,
            integrator,
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = seed;
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SimulationConfig {
        &mut self.config
    }

    pub fn integrator(&self) -> &dyn Integrator {
        self.integrator.as_ref()
    }

    /// The projection every line of a batch with the current seed uses
    pub fn projection(&self) -> Projection {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        Projection::create_matrix(&mut rng, self.config.generation.orthogonalize)
    }

    fn sampler<'a>(&'a self, projection: &'a Projection) -> OrbitSampler<'a> {
        let rendering = &self.config.rendering;
        OrbitSampler::new(projection, self.integrator.as_ref())
            .with_config(self.config.sampler.clone())
            .with_solver(self.config.physics.solver())
            .with_color_mode(
                rendering.color_mode,
                rendering.colored_body,
                rendering.speed_reference,
            )
    }

    /// Computes a single line of the batch. Its result depends only on the
    /// master seed, the line index and the configuration.
    pub fn generate_line(
        &self,
        projection: &Projection,
        index: usize,
        sample_count: usize,
    ) -> Result<Orbit, OrbitError> {
        self.compute_line(&self.sampler(projection), index, sample_count)
    }

    fn compute_line(
        &self,
        sampler: &OrbitSampler<'_>,
        index: usize,
        sample_count: usize,
    ) -> Result<Orbit, OrbitError> {
        let mut rng = ChaCha8Rng::seed_from_u64(line_seed(self.seed, index));
        let system = random_system(&mut rng, &self.config.generation);
        let line_color = random_line_color(&mut rng);
        sampler.compute_orbit(system, sample_count, line_color)
    }

    /// Computes `line_count` lines in parallel.
    ///
    /// Lines that fail with a line-local error are skipped and counted.
    /// The result does not depend on the number of worker threads.
    ///
    /// Cancellation is all-or-nothing: the token is checked before each line
    /// and between steps, and lines that already finished are discarded.
    pub fn generate_batch(
        &self,
        line_count: usize,
        sample_count: usize,
        cancel: &CancellationToken,
    ) -> Result<OrbitBatch, OrbitError> {
        let projection = self.projection();
        let sampler = self.sampler(&projection).with_cancellation(cancel);

        let results: Vec<Result<Orbit, OrbitError>> = (0..line_count)
            .into_par_iter()
            .map(|index| {
                if cancel.is_cancelled() {
                    return Err(OrbitError::Cancelled);
                }
                self.compute_line(&sampler, index, sample_count)
            })
            .collect();

        let mut orbits = Vec::with_capacity(line_count);
        let mut skipped = 0;
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(orbit) => orbits.push(orbit),
                Err(e) if e.is_line_local() => {
                    warn!("Skipping line {index}: {e}");
                    skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(OrbitBatch {
            orbits,
            projection,
            seed: self.seed,
            skipped,
        })
    }

    /// Generates a batch sized by the configuration
    pub fn generate_data(&self, cancel: &CancellationToken) -> Result<OrbitBatch, OrbitError> {
        let generation = &self.config.generation;
        self.generate_batch(generation.line_count, generation.sample_count, cancel)
    }
}
