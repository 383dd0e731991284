//! Bevy application setup

use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use tracing::{info, warn};
use vitrine_core::SceneConfig;
use vitrine_scene::VitrineScenePlugin;

/// Canvas element the page reserves for the scene
pub const CANVAS_SELECTOR: &str = "#model-canvas";

/// Overrides read from the page URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOverrides {
    pub model: Option<String>,
    pub seed: Option<String>,
}

impl QueryOverrides {
    fn from_location() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };
        let Ok(href) = window.location().href() else {
            return Self::default();
        };
        match web_sys::Url::new(&href) {
            Ok(url) => {
                let params = url.search_params();
                Self {
                    model: params.get("model"),
                    seed: params.get("seed"),
                }
            }
            Err(_) => Self::default(),
        }
    }

    pub fn apply(self, mut config: SceneConfig) -> SceneConfig {
        if let Some(model) = self.model.filter(|model| !model.trim().is_empty()) {
            info!("Loading model from URL parameter: {}", model);
            config.model.url = model;
        }
        if let Some(seed) = self.seed {
            match seed.trim().parse::<u64>() {
                Ok(seed) => config.particles.seed = Some(seed),
                Err(_) => warn!("Ignoring invalid seed parameter: {}", seed),
            }
        }
        config
    }
}

/// Run the Bevy application
pub fn run() {
    let config = QueryOverrides::from_location().apply(SceneConfig::default());

    App::new()
        .add_plugins(DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Vitrine".to_string(),
                    canvas: Some(CANVAS_SELECTOR.to_string()),
                    fit_canvas_to_parent: true,
                    prevent_default_event_handling: false,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                // Load assets relative to the page
                file_path: "".to_string(),
                // Don't look for .meta files - static hosting doesn't have them
                meta_check: AssetMetaCheck::Never,
                ..default()
            })
        )
        .add_plugins(VitrineScenePlugin { config })
        .run();
}
