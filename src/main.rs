use bevy::log::LogPlugin;
use bevy_panorbit_camera::PanOrbitCameraPlugin;
use clap::Parser;
use phaseviz::cli::{self, Args};
use phaseviz::plugins::camera::CameraPlugin;
use phaseviz::plugins::controls::ControlsPlugin;
use phaseviz::plugins::headless::HeadlessPlugin;
use phaseviz::plugins::orbits::OrbitsPlugin;
use phaseviz::plugins::visualization::VisualizationPlugin;
use phaseviz::prelude::*;

fn main() -> AppExit {
    let args = Args::parse();

    if args.list_integrators {
        cli::handle_list_integrators();
        return AppExit::Success;
    }

    let mut config = match cli::load_and_apply_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return AppExit::error();
        }
    };

    // Pin the seed so the printed configuration reproduces this run
    let seed = *config
        .generation
        .seed
        .get_or_insert_with(|| rand::rng().random());

    if args.print_config {
        return match toml::to_string_pretty(&config) {
            Ok(toml_string) => {
                println!("{toml_string}");
                AppExit::Success
            }
            Err(e) => {
                eprintln!("Failed to serialize configuration to TOML: {e}");
                AppExit::error()
            }
        };
    }

    if let Some(path) = &args.save_config {
        return match config.save(path) {
            Ok(()) => {
                println!("Configuration saved to: {}", path.display());
                AppExit::Success
            }
            Err(e) => {
                eprintln!("Failed to save configuration to {}: {e}", path.display());
                AppExit::error()
            }
        };
    }

    let generator = match OrbitGenerator::from_config(&config) {
        Ok(generator) => generator,
        Err(e) => {
            eprintln!("Error: {e}");
            return AppExit::error();
        }
    };
    println!("Using seed: {seed}");

    let mut app = App::new();
    app.insert_resource(SharedRng::from_seed(seed));
    app.insert_resource(Generator(generator));
    app.insert_resource(config);

    if args.headless {
        app.add_plugins((MinimalPlugins, LogPlugin::default(), HeadlessPlugin));
    } else {
        app.add_plugins((
            DefaultPlugins.set(WindowPlugin {
                primary_window: Some(Window {
                    title: "PhaseViz".to_string(),
                    ..default()
                }),
                ..default()
            }),
            PanOrbitCameraPlugin,
            CameraPlugin,
            ControlsPlugin,
            OrbitsPlugin,
            VisualizationPlugin,
        ));
    }

    app.run()
}
