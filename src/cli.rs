//! Command line interface for PhaseViz

use clap::Parser;
use std::fmt;
use std::path::PathBuf;

use crate::config::SimulationConfig;
use crate::physics::integrators::registry::IntegratorRegistry;
use crate::utils::color::ColorMode;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("BUILD_DATE"),
    ", ",
    env!("BUILD_PROFILE"),
    ")"
);

/// CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// Configuration file could not be loaded
    ConfigLoad(String),
    /// Invalid integrator name provided
    InvalidIntegrator(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::ConfigLoad(msg) => write!(f, "Failed to load configuration: {msg}"),
            CliError::InvalidIntegrator(msg) => write!(f, "Invalid integrator: {msg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<config::ConfigError> for CliError {
    fn from(error: config::ConfigError) -> Self {
        CliError::ConfigLoad(error.to_string())
    }
}

/// PhaseViz - three-body orbits projected from phase space
#[derive(Parser, Debug, Default)]
#[command(version, long_version = LONG_VERSION, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML format)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of orbit lines to generate (overrides config file)
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub lines: Option<usize>,

    /// Vertices per line (overrides config file)
    #[arg(long, value_name = "COUNT")]
    pub samples: Option<usize>,

    /// Master seed for the projection and initial conditions
    #[arg(short = 's', long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Integrator type (e.g., velocity_verlet, pefrl)
    #[arg(short = 'i', long, value_name = "TYPE")]
    pub integrator: Option<String>,

    /// Vertex coloring (line or body_speed)
    #[arg(long, value_name = "MODE")]
    pub color_mode: Option<ColorMode>,

    /// Make the projection rows mutually orthogonal
    #[arg(long)]
    pub orthogonalize: bool,

    /// Generate once, log statistics and exit without opening a window
    #[arg(long)]
    pub headless: bool,

    /// List available integrators and exit
    #[arg(long)]
    pub list_integrators: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Write the effective configuration to FILE and exit
    #[arg(long, value_name = "FILE")]
    pub save_config: Option<PathBuf>,
}

/// Handles the --list-integrators flag by printing available integrators and exiting
pub fn handle_list_integrators() {
    let registry = IntegratorRegistry::new();
    println!("Available integrators:");
    for name in registry.list_available() {
        println!("  - {name}");
    }

    let aliases = registry.list_aliases();
    if !aliases.is_empty() {
        println!("\nAliases:");
        for (alias, target) in aliases {
            println!("  - {alias} -> {target}");
        }
    }
}

/// Loads configuration from file or defaults, then applies command-line overrides
///
/// An explicitly named configuration file must exist and parse; the per-user
/// file silently falls back to defaults.
pub fn load_and_apply_config(args: &Args) -> Result<SimulationConfig, CliError> {
    let mut config = if let Some(config_path) = &args.config {
        println!("Loading configuration from: {}", config_path.display());
        SimulationConfig::load(Some(config_path.as_path()))?
    } else {
        SimulationConfig::load_from_user_config()
    };

    if let Some(lines) = args.lines {
        println!("Overriding line count to: {lines}");
        config.generation.line_count = lines;
    }

    if let Some(samples) = args.samples {
        println!("Overriding samples per line to: {samples}");
        config.generation.sample_count = samples;
    }

    if let Some(integrator_type) = &args.integrator {
        println!("Using integrator: {integrator_type}");
        config.physics.integrator = integrator_type.clone();
    }

    // Validate the final name, whether it came from the file or the command line
    IntegratorRegistry::new()
        .create(&config.physics.integrator)
        .map_err(CliError::InvalidIntegrator)?;

    if let Some(seed) = args.seed {
        println!("Using random seed: {seed}");
        config.generation.seed = Some(seed);
    }

    if let Some(color_mode) = args.color_mode {
        println!("Using color mode: {color_mode:?}");
        config.rendering.color_mode = color_mode;
    }

    if args.orthogonalize {
        config.generation.orthogonalize = true;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = Args::parse_from([
            "phaseviz",
            "-n",
            "12",
            "--samples",
            "500",
            "-s",
            "7",
            "-i",
            "pefrl",
            "--color-mode",
            "body_speed",
            "--orthogonalize",
            "--headless",
            "--save-config",
            "out.toml",
        ]);

        assert_eq!(args.lines, Some(12));
        assert_eq!(args.samples, Some(500));
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.integrator.as_deref(), Some("pefrl"));
        assert_eq!(args.color_mode, Some(ColorMode::BodySpeed));
        assert!(args.orthogonalize);
        assert!(args.headless);
        assert!(!args.print_config);
        assert_eq!(args.save_config, Some(PathBuf::from("out.toml")));
    }

    #[test]
    fn test_overrides_apply() {
        let path =
            std::env::temp_dir().join(format!("phaseviz-cli-{}.toml", std::process::id()));
        std::fs::write(&path, "[generation]\nline_count = 3\nsample_count = 10\n").unwrap();

        let args = Args {
            config: Some(path.clone()),
            samples: Some(99),
            seed: Some(5),
            integrator: Some("verlet".to_string()),
            orthogonalize: true,
            ..Default::default()
        };
        let config = load_and_apply_config(&args);
        std::fs::remove_file(&path).ok();
        let config = config.unwrap();

        assert_eq!(config.generation.line_count, 3);
        assert_eq!(config.generation.sample_count, 99);
        assert_eq!(config.generation.seed, Some(5));
        assert_eq!(config.physics.integrator, "verlet");
        assert!(config.generation.orthogonalize);
    }

    #[test]
    fn test_invalid_integrator() {
        let path =
            std::env::temp_dir().join(format!("phaseviz-cli-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "").unwrap();

        let args = Args {
            config: Some(path.clone()),
            integrator: Some("euler".to_string()),
            ..Default::default()
        };
        let result = load_and_apply_config(&args);
        std::fs::remove_file(&path).ok();

        match result {
            Err(CliError::InvalidIntegrator(msg)) => assert!(msg.contains("euler")),
            other => panic!("expected invalid integrator, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let args = Args {
            config: Some(PathBuf::from("/nonexistent/phaseviz/config.toml")),
            ..Default::default()
        };

        assert!(matches!(
            load_and_apply_config(&args),
            Err(CliError::ConfigLoad(_))
        ));
    }
}
