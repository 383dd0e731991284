//! One core frame per Bevy update

use bevy::prelude::*;
use tracing::debug;
use vitrine_core::render_loop::FrameReport;
use vitrine_core::scene::ModelTransform;
use vitrine_core::{DrawTarget, FrameScheduler, RenderLoop, Scene};

use crate::FrameSet;

pub struct FramePlugin;

impl Plugin for FramePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, run_frame.in_set(FrameSet::Advance));
    }
}

/// The winit loop redraws on every display refresh, so a request only has
/// to be recorded
#[derive(Debug, Default)]
pub struct ContinuousFrames {
    requested: u64,
}

impl ContinuousFrames {
    pub fn requested(&self) -> u64 {
        self.requested
    }
}

impl FrameScheduler for ContinuousFrames {
    fn request_frame(&mut self) {
        self.requested += 1;
    }
}

/// What the last core frame drew, waiting to be copied onto entities
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSnapshot {
    pub camera_position: Vec3,
    pub camera_target: Vec3,
    pub model: Option<ModelTransform>,
    pub fallback_rotation: Option<Vec3>,
    pub particles: Vec<Vec3>,
}

impl FrameSnapshot {
    fn from_scene(scene: &Scene) -> Self {
        let mut snapshot = Self::default();
        snapshot.draw(scene);
        snapshot
    }
}

impl DrawTarget for FrameSnapshot {
    fn draw(&mut self, scene: &Scene) {
        self.camera_position = scene.camera.position;
        self.camera_target = scene.camera.target;
        self.model = scene.model().map(|model| model.transform);
        self.fallback_rotation = scene.fallback().map(|fallback| fallback.rotation);
        self.particles.clear();
        self.particles
            .extend(scene.particles.particles().iter().map(|particle| particle.position));
    }
}

/// The composed scene together with the loop that drives it
#[derive(Resource)]
pub struct Showcase {
    scene: Scene,
    render_loop: RenderLoop<ContinuousFrames, FrameSnapshot>,
}

impl Showcase {
    pub fn new(scene: Scene) -> Self {
        let snapshot = FrameSnapshot::from_scene(&scene);
        let mut render_loop = RenderLoop::new(ContinuousFrames::default(), snapshot);
        render_loop.start();
        Self { scene, render_loop }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn snapshot(&self) -> &FrameSnapshot {
        self.render_loop.target()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.render_loop.frames_rendered()
    }

    pub fn frames_requested(&self) -> u64 {
        self.render_loop.scheduler().requested()
    }

    pub fn frame(&mut self, now_ms: f64) -> Option<FrameReport> {
        self.render_loop.frame(&mut self.scene, now_ms)
    }
}

fn run_frame(mut showcase: ResMut<Showcase>, time: Res<Time>) {
    let now_ms = time.elapsed_secs_f64() * 1000.0;
    if let Some(report) = showcase.frame(now_ms) {
        if report.frame % 600 == 0 {
            debug!(
                frame = report.frame,
                model = report.model_attached,
                fallback = report.fallback_attached,
                "Render loop heartbeat"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use vitrine_core::{AssetLoadError, SceneConfig, Viewport};

    fn showcase() -> Showcase {
        let scene = Scene::initialize(
            Some(Viewport::new(1280, 720, 2.0)),
            SceneConfig::default(),
            &mut StdRng::seed_from_u64(9),
        )
        .unwrap();
        Showcase::new(scene)
    }

    #[test]
    fn test_snapshot_before_first_frame() {
        let showcase = showcase();
        let snapshot = showcase.snapshot();
        assert_eq!(snapshot.camera_position, Vec3::new(0.0, 0.0, 5.0));
        assert_eq!(snapshot.particles.len(), 100);
        assert!(snapshot.model.is_none());
        assert!(snapshot.fallback_rotation.is_none());
    }

    #[test]
    fn test_frame_updates_snapshot() {
        let mut showcase = showcase();
        let report = showcase.frame(250.0).unwrap();
        assert_eq!(report.frame, 1);
        assert_eq!(showcase.frames_rendered(), 1);
        assert_eq!(showcase.frames_requested(), 2);

        let positions = showcase.snapshot().particles.clone();
        for (particle, position) in showcase.scene().particles.particles().iter().zip(&positions) {
            assert_eq!(particle.position_at(250.0), *position);
        }
    }

    #[test]
    fn test_fallback_rotation_reaches_snapshot() {
        let mut showcase = showcase();
        showcase
            .scene_mut()
            .on_model_failed(AssetLoadError::new("assets/samurai.glb", "404 Not Found"));
        showcase.frame(0.0).unwrap();
        showcase.frame(16.0).unwrap();

        let rotation = showcase.snapshot().fallback_rotation.unwrap();
        assert!((rotation.x - 0.02).abs() < 1e-6);
        assert!((rotation.y - 0.04).abs() < 1e-6);
        assert!(showcase.snapshot().model.is_none());
    }
}
