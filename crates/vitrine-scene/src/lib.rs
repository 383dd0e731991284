//! Vitrine Scene - Bevy frontend for the showcase scene
//!
//! The engine-independent state lives in `vitrine-core`; the plugins here
//! compose the matching entities, feed input and asset events into it, run
//! one core frame per Bevy update and copy the result back onto transforms.
//! Both the web canvas and the native viewer add [`VitrineScenePlugin`].

pub mod camera;
pub mod environment;
pub mod frame;
pub mod models;
pub mod particles;
pub mod scene;

use bevy::prelude::*;
use vitrine_core::SceneConfig;

pub use camera::MainCamera;
pub use frame::{FrameSnapshot, Showcase};

/// Configuration the scene was started with
#[derive(Debug, Clone, Resource)]
pub struct SceneSettings(pub SceneConfig);

/// Per-frame ordering: input and asset events, then the core frame, then the
/// copy back onto entities
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Input,
    Advance,
    Sync,
}

/// Plugin that sets up the whole showcase scene
pub struct VitrineScenePlugin {
    pub config: SceneConfig,
}

impl Plugin for VitrineScenePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SceneSettings(self.config.clone()))
            .configure_sets(
                Update,
                (FrameSet::Input, FrameSet::Advance, FrameSet::Sync)
                    .chain()
                    .run_if(resource_exists::<Showcase>),
            )
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(camera::CameraPlugin)
            .add_plugins(models::ModelsPlugin)
            .add_plugins(particles::ParticlesPlugin)
            .add_plugins(environment::EnvironmentPlugin)
            .add_plugins(frame::FramePlugin);
    }
}
