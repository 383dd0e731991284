//! The scene aggregate and its composer
//!
//! [`Scene`] owns everything that is drawn: camera, output surface, lights,
//! the optional model or fallback, the particle field and the orbit
//! controller. All mutation goes through named operations so the engine
//! frontend and the headless tests drive exactly the same state machine.

use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;
use tracing::{debug, info, warn};

use crate::animation::{EntranceAnimation, ENTRANCE_START_Y, FALLBACK_SPIN, MODEL_IDLE_SPIN};
use crate::asset::{LoadEvent, LoadTracker, LoadUpdate};
use crate::config::SceneConfig;
use crate::error::{AssetLoadError, SceneError};
use crate::geometry::TorusKnot;
use crate::lighting::LightingRig;
use crate::orbit::OrbitController;
use crate::particles::ParticleField;
use crate::viewport::{PerspectiveCamera, RenderSurface, Viewport};

/// One node of a loaded model hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub is_mesh: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn group(name: impl Into<String>, children: Vec<SceneNode>) -> Self {
        Self {
            name: name.into(),
            is_mesh: false,
            cast_shadow: false,
            receive_shadow: false,
            children,
        }
    }

    pub fn mesh(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_mesh: true,
            cast_shadow: false,
            receive_shadow: false,
            children: Vec::new(),
        }
    }

    /// Depth-first visit of this node and all descendants
    pub fn traverse_mut(&mut self, visit: &mut impl FnMut(&mut SceneNode)) {
        visit(self);
        for child in &mut self.children {
            child.traverse_mut(visit);
        }
    }

    pub fn traverse(&self, visit: &mut impl FnMut(&SceneNode)) {
        visit(self);
        for child in &self.children {
            child.traverse(visit);
        }
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.traverse(&mut |node| count += usize::from(node.is_mesh));
        count
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    pub position: Vec3,
    pub scale: f32,
    /// Euler angles in radians
    pub rotation: Vec3,
}

/// Idle spin plus the one-shot entrance of a loaded model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelMotion {
    /// Rotation accumulated by the idle spin, kept within [0, 2π)
    pub idle_rotation: f32,
    pub entrance: Option<EntranceAnimation>,
    pub rest_y: f32,
}

impl ModelMotion {
    pub fn new(started_ms: f64, rest_y: f32) -> Self {
        Self {
            idle_rotation: 0.0,
            entrance: Some(EntranceAnimation::new(started_ms, rest_y)),
            rest_y,
        }
    }

    /// Advance one frame; returns the rotation about Y and the height to apply
    pub fn step(&mut self, now_ms: f64) -> (f32, f32) {
        self.idle_rotation = (self.idle_rotation + MODEL_IDLE_SPIN).rem_euclid(TAU);
        let mut offset = 0.0;
        let mut y = self.rest_y;
        if let Some(entrance) = self.entrance {
            let sample = entrance.sample(now_ms);
            if sample.finished {
                debug!("Entrance animation finished");
                self.entrance = None;
            } else {
                offset = sample.rotation_offset;
                y = sample.y;
            }
        }
        (self.idle_rotation + offset, y)
    }
}

/// A successfully loaded model, attached to the scene
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub root: SceneNode,
    pub transform: ModelTransform,
    pub motion: ModelMotion,
}

impl Model {
    /// Whether every mesh node casts and receives shadows
    pub fn all_meshes_shadowed(&self) -> bool {
        let mut ok = true;
        self.root.traverse(&mut |node| {
            if node.is_mesh {
                ok &= node.cast_shadow && node.receive_shadow;
            }
        });
        ok
    }

    fn step(&mut self, now_ms: f64) {
        let (rotation_y, y) = self.motion.step(now_ms);
        self.transform.rotation.y = rotation_y;
        self.transform.position.y = y;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackMaterial {
    pub color: u32,
    pub metalness: f32,
    pub roughness: f32,
}

impl Default for FallbackMaterial {
    fn default() -> Self {
        Self {
            color: 0xd4af37,
            metalness: 0.7,
            roughness: 0.3,
        }
    }
}

/// Procedural stand-in shown when the model cannot be loaded
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackRenderable {
    pub geometry: TorusKnot,
    pub material: FallbackMaterial,
    pub rotation: Vec3,
    pub cast_shadow: bool,
}

impl Default for FallbackRenderable {
    fn default() -> Self {
        Self {
            geometry: TorusKnot::default(),
            material: FallbackMaterial::default(),
            rotation: Vec3::ZERO,
            cast_shadow: true,
        }
    }
}

impl FallbackRenderable {
    /// Angles wrap to [0, 2π) so the step size never degrades over a long session
    pub fn spin(&mut self) {
        self.rotation.x = (self.rotation.x + FALLBACK_SPIN[0]).rem_euclid(TAU);
        self.rotation.y = (self.rotation.y + FALLBACK_SPIN[1]).rem_euclid(TAU);
    }
}

/// Environment cube map lifecycle
#[derive(Debug, Clone, PartialEq)]
pub enum EnvironmentState {
    Disabled,
    Loading(LoadTracker),
    Applied,
    /// Load failed; the plain background colour is in effect
    Unavailable,
}

#[derive(Debug, Clone)]
pub struct Scene {
    config: SceneConfig,
    viewport: Viewport,
    pub camera: PerspectiveCamera,
    pub surface: RenderSurface,
    pub background: u32,
    pub lights: LightingRig,
    pub particles: ParticleField,
    pub controls: OrbitController,
    model: Option<Model>,
    fallback: Option<FallbackRenderable>,
    model_load: LoadTracker,
    environment: EnvironmentState,
}

impl Scene {
    /// Compose camera, surface, lights and particles, and issue the asset loads
    ///
    /// Fails fast when there is no container to draw into.
    pub fn initialize<R: Rng + ?Sized>(
        container: Option<Viewport>,
        config: SceneConfig,
        rng: &mut R,
    ) -> Result<Self, SceneError> {
        let viewport = container.ok_or(SceneError::ViewportUnavailable)?.validated()?;
        config.validate()?;

        let camera = PerspectiveCamera::from_config(&config.camera, &viewport);
        let controls = OrbitController::new(camera.position, camera.target, &config.camera);
        let particles = ParticleField::generate(config.particles.count, rng);
        let model_load = LoadTracker::new(config.model.url.clone());
        let environment = if config.environment.enabled {
            EnvironmentState::Loading(LoadTracker::new(config.environment.faces.join(",")))
        } else {
            EnvironmentState::Disabled
        };

        info!(
            width = viewport.width,
            height = viewport.height,
            particles = particles.len(),
            "Scene initialized"
        );

        Ok(Self {
            surface: RenderSurface::for_viewport(&viewport),
            background: config.background_color,
            lights: LightingRig::default(),
            camera,
            controls,
            particles,
            model: None,
            fallback: None,
            model_load,
            environment,
            viewport,
            config,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Recompute aspect and surface size from the container's current size
    ///
    /// Works from absolute dimensions only, so repeated or identical calls
    /// never drift. A collapsed container keeps the last valid state.
    pub fn handle_resize(&mut self, viewport: Viewport) {
        let viewport = match viewport.validated() {
            Ok(viewport) => viewport,
            Err(err) => {
                warn!("Ignoring resize: {}", err);
                return;
            }
        };
        self.viewport = viewport;
        self.camera.aspect = viewport.aspect();
        self.surface = RenderSurface::for_viewport(&viewport);
        debug!(
            width = viewport.width,
            height = viewport.height,
            aspect = self.camera.aspect,
            "Viewport resized"
        );
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn fallback(&self) -> Option<&FallbackRenderable> {
        self.fallback.as_ref()
    }

    pub fn model_load(&self) -> &LoadTracker {
        &self.model_load
    }

    pub fn environment(&self) -> &EnvironmentState {
        &self.environment
    }

    pub fn on_model_progress(&mut self, loaded: u64, total: Option<u64>) {
        self.model_load.observe(LoadEvent::Progress { loaded, total });
    }

    /// Attach a loaded hierarchy; returns false when the attempt had already finished
    pub fn on_model_loaded(&mut self, mut root: SceneNode, now_ms: f64) -> bool {
        if self.model_load.observe(LoadEvent::Succeeded) != LoadUpdate::Succeeded {
            return false;
        }

        root.traverse_mut(&mut |node| {
            if node.is_mesh {
                node.cast_shadow = true;
                node.receive_shadow = true;
            }
        });

        let rest_y = self.config.model.y_offset;
        self.model = Some(Model {
            root,
            transform: ModelTransform {
                position: Vec3::new(0.0, ENTRANCE_START_Y, 0.0),
                scale: self.config.model.scale,
                rotation: Vec3::ZERO,
            },
            motion: ModelMotion::new(now_ms, rest_y),
        });
        true
    }

    /// Substitute the fallback; returns false when the attempt had already finished
    pub fn on_model_failed(&mut self, err: AssetLoadError) -> bool {
        if !matches!(self.model_load.observe(LoadEvent::Failed(err)), LoadUpdate::Failed(_)) {
            return false;
        }
        self.fallback = Some(FallbackRenderable::default());
        true
    }

    pub fn on_environment_loaded(&mut self) {
        if let EnvironmentState::Loading(tracker) = &mut self.environment {
            if tracker.observe(LoadEvent::Succeeded) == LoadUpdate::Succeeded {
                self.environment = EnvironmentState::Applied;
            }
        }
    }

    pub fn on_environment_failed(&mut self, err: AssetLoadError) {
        if let EnvironmentState::Loading(tracker) = &mut self.environment {
            if matches!(tracker.observe(LoadEvent::Failed(err)), LoadUpdate::Failed(_)) {
                self.background = self.config.background_color;
                self.environment = EnvironmentState::Unavailable;
            }
        }
    }

    /// Idle spin and entrance for the model, continuous spin for the fallback
    pub fn step_objects(&mut self, now_ms: f64) {
        if let Some(model) = &mut self.model {
            model.step(now_ms);
        }
        if let Some(fallback) = &mut self.fallback {
            fallback.spin();
        }
    }

    /// Apply damping and move the camera onto the orbit
    pub fn update_controls(&mut self) {
        self.camera.position = self.controls.update();
        self.camera.target = self.controls.focus;
    }
}
