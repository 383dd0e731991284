//! Vitrine Viewer - Native preview window for the showcase scene
//!
//! Reads the scene configuration from a TOML file and opens a desktop
//! window running the same plugins as the web canvas.

use anyhow::Result;
use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use vitrine_core::{load_config, save_default_config, SceneConfig};
use vitrine_scene::VitrineScenePlugin;

#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(about = "Preview the Vitrine showcase scene in a desktop window")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "vitrine.toml")]
    config: PathBuf,

    /// Model to load instead of the configured one
    #[arg(short, long)]
    model: Option<String>,

    /// Fixed particle seed for reproducible layouts
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    write_default_config: bool,
}

impl Args {
    fn apply(&self, mut config: SceneConfig) -> SceneConfig {
        if let Some(model) = &self.model {
            config.model.url = model.clone();
        }
        if let Some(seed) = self.seed {
            config.particles.seed = Some(seed);
        }
        config
    }
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&args.log_level))
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Vitrine v{}", env!("CARGO_PKG_VERSION"));

    if args.write_default_config {
        save_default_config(&args.config)?;
        info!(path = %args.config.display(), "Default configuration written");
        return Ok(());
    }

    let config = args.apply(load_config(&args.config)?);
    config.validate()?;

    info!(
        model = %config.model.url,
        particles = config.particles.count,
        environment = config.environment.enabled,
        "Configuration loaded"
    );

    App::new()
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Vitrine".to_string(),
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                // Asset paths in the config are relative to the working directory
                file_path: "".to_string(),
                meta_check: AssetMetaCheck::Never,
                ..default()
            })
        )
        .add_plugins(VitrineScenePlugin { config })
        .run();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_args() {
        let args = Args::try_parse_from(["vitrine"]).unwrap();
        assert_eq!(args.config, PathBuf::from("vitrine.toml"));
        assert_eq!(args.log_level, "info");
        assert!(!args.write_default_config);

        let config = args.apply(SceneConfig::default());
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let args =
            Args::try_parse_from(["vitrine", "--model", "assets/bust.glb", "--seed", "7"])
                .unwrap();
        let config = args.apply(SceneConfig::default());
        assert_eq!(config.model.url, "assets/bust.glb");
        assert_eq!(config.particles.seed, Some(7));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("loud"), Level::INFO);
    }

    #[test]
    fn test_written_default_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vitrine.toml");
        save_default_config(&path).unwrap();
        assert_eq!(load_config(&path).unwrap(), SceneConfig::default());
    }
}
