use crate::physics::generator::{CancellationToken, OrbitBatch, OrbitGenerator};
use crate::physics::projection::Axis;
use crate::prelude::*;
use rand_chacha::{ChaCha8Rng, rand_core::SeedableRng};

/// Source of fresh master seeds when the viewer regenerates
#[derive(Resource, Deref, DerefMut, Debug, Clone, PartialEq)]
pub struct SharedRng(pub ChaCha8Rng);

impl SharedRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

#[derive(Resource, Deref, DerefMut)]
pub struct Generator(pub OrbitGenerator);

/// The batch currently on screen
#[derive(Resource, Default, Debug)]
pub struct Orbits {
    pub batch: Option<OrbitBatch>,
    /// Incremented on every successful regeneration
    pub generation: u64,
}

impl Orbits {
    pub fn replace(&mut self, batch: OrbitBatch) {
        self.batch = Some(batch);
        self.generation += 1;
    }
}

#[derive(Resource, Default, Deref, Debug, Clone)]
pub struct GenerationCancel(pub CancellationToken);

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct DisplaySettings {
    pub axis: Axis,
    pub colored_body: usize,
    pub show_axes: bool,
    pub show_bounds: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

impl DisplaySettings {
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            axis: config.rendering.initial_axis,
            colored_body: config.rendering.colored_body % crate::physics::body::BODY_COUNT,
            show_axes: config.rendering.show_axes,
            show_bounds: config.rendering.show_bounds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_rng_deterministic_with_seed() {
        let seed = 12345u64;
        let mut rng1 = SharedRng::from_seed(seed);
        let mut rng2 = SharedRng::from_seed(seed);

        let values1: Vec<u64> = (0..10).map(|_| rng1.random()).collect();
        let values2: Vec<u64> = (0..10).map(|_| rng2.random()).collect();

        assert_eq!(values1, values2);
    }

    #[test]
    fn test_display_settings_wrap_colored_body() {
        let mut config = SimulationConfig::default();
        config.rendering.colored_body = 5;
        config.rendering.initial_axis = Axis::Vel1;

        let settings = DisplaySettings::from_config(&config);
        assert_eq!(settings.colored_body, 2);
        assert_eq!(settings.axis, Axis::Vel1);
    }
}
