use crate::physics::gravity::{DegeneratePolicy, GravitySolver};
use crate::physics::math::Scalar;
use crate::physics::projection::Axis;
use crate::utils::color::ColorMode;
use bevy::prelude::*;
use config::{Config, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `PHASEVIZ__GENERATION__LINE_COUNT=8`
pub const ENV_PREFIX: &str = "PHASEVIZ";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub physics: PhysicsConfig,
    pub sampler: SamplerConfig,
    pub generation: GenerationConfig,
    pub rendering: RenderingConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Integrator name or alias, resolved through the integrator registry
    pub integrator: String,
    /// Separation below which the degenerate-distance policy applies
    pub min_distance: Scalar,
    pub degenerate_policy: DegeneratePolicy,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        let solver = GravitySolver::default();
        Self {
            integrator: "velocity_verlet".to_string(),
            min_distance: solver.min_distance,
            degenerate_policy: solver.policy,
        }
    }
}

impl PhysicsConfig {
    pub fn solver(&self) -> GravitySolver {
        GravitySolver::new(self.min_distance, self.degenerate_policy)
    }
}

/// Adaptive stepping and decimation thresholds, all measured in projected space
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SamplerConfig {
    pub initial_step: Scalar,
    /// Raw displacement above which a step is rolled back and halved
    pub reject_threshold: Scalar,
    /// Raw displacement below which the next step is doubled
    pub grow_threshold: Scalar,
    /// Distance from the last vertex that always emits a new vertex
    pub emit_threshold: Scalar,
    /// Distance from the last vertex that emits on keep-alive steps
    pub keepalive_threshold: Scalar,
    pub keepalive_period: u64,
    /// Consecutive rollbacks after which a step is accepted anyway
    pub max_rejections: u32,
    pub max_step: Option<Scalar>,
    /// Raw integration steps allowed for a single orbit
    pub max_steps: u64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            initial_step: 0.01,
            reject_threshold: 1e-3,
            grow_threshold: 1e-4,
            emit_threshold: 5e-2,
            keepalive_threshold: 1e-2,
            keepalive_period: 100,
            max_rejections: 64,
            max_step: None,
            max_steps: 50_000_000,
        }
    }
}

/// Initial conditions and batch size for orbit generation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    pub line_count: usize,
    pub sample_count: usize,
    /// Master seed; drawn from entropy when absent
    pub seed: Option<u64>,
    /// Gram-Schmidt the projection rows instead of only normalizing them
    pub orthogonalize: bool,
    /// Half-width of the cube body positions are drawn from
    pub position_radius: Scalar,
    /// Half-width of the cube body velocities are drawn from
    pub initial_speed: Scalar,
    /// Flatten initial positions onto the xy plane
    pub planar: bool,
    pub body1_offset_y: Scalar,
    pub body2_offset_y: Scalar,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            line_count: 2,
            sample_count: 8000,
            seed: None,
            orthogonalize: false,
            position_radius: 0.1,
            initial_speed: 0.0,
            planar: true,
            body1_offset_y: -1.0,
            body2_offset_y: 2.0,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RenderingConfig {
    pub color_mode: ColorMode,
    /// Body whose speed drives vertex colors in `body_speed` mode
    pub colored_body: usize,
    pub speed_reference: Scalar,
    pub initial_axis: Axis,
    pub show_axes: bool,
    pub show_bounds: bool,
    pub camera_radius_multiplier: f32,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::Line,
            colored_body: 0,
            speed_reference: 1.0,
            initial_axis: Axis::Pos0,
            show_axes: true,
            show_bounds: false,
            camera_radius_multiplier: 2.0,
        }
    }
}

impl SimulationConfig {
    /// Layers built-in defaults, an optional TOML file and `PHASEVIZ__*`
    /// environment variables, in that order of precedence.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder =
                builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }

        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a file, falling back to defaults if the file doesn't exist
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("Config file {} not found. Using defaults.", path.display());
            return Self::default();
        }

        match Self::load(Some(path)) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to parse config file {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Location of the per-user configuration file, if the platform has one
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "phaseviz")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    pub fn load_from_user_config() -> Self {
        match Self::user_config_path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                debug!("No user configuration directory available. Using defaults.");
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
