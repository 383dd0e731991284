//! Vitrine Core - Engine-independent model of the showcase scene
//!
//! This crate holds everything about the scene that does not need a GPU:
//! - Configuration loading and validation
//! - Particle field sampling and animation
//! - Orbit camera controller with damping and clamps
//! - Asset load tracking with fallback-on-failure semantics
//! - The scene aggregate, its composer and the scheduler-driven render loop

pub mod animation;
pub mod asset;
pub mod config;
pub mod error;
pub mod geometry;
pub mod lighting;
pub mod orbit;
pub mod particles;
pub mod render_loop;
pub mod scene;
pub mod viewport;

pub use asset::{LoadEvent, LoadProgress, LoadStatus, LoadTracker, LoadUpdate};
pub use config::{load_config, save_default_config, SceneConfig};
pub use error::{AssetLoadError, ConfigError, SceneError};
pub use orbit::OrbitController;
pub use particles::{Particle, ParticleField};
pub use render_loop::{DrawTarget, FrameScheduler, RenderLoop};
pub use scene::{FallbackRenderable, Model, ModelMotion, Scene, SceneNode};
pub use viewport::{PerspectiveCamera, RenderSurface, Viewport};
