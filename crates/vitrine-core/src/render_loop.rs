//! Frame-driven render loop with an injected scheduler
//!
//! Every frame first re-arms the next one, then moves the scene forward and
//! ends with exactly one draw. The host decides when frames happen (display
//! refresh on a real surface, explicit calls in tests).

use tracing::{debug, info};

use crate::scene::Scene;

/// "Run the next frame before the next refresh" primitive of the host
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Whatever turns the scene into pixels
pub trait DrawTarget {
    fn draw(&mut self, scene: &Scene);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Not started yet; nothing ever returns the loop here
    Stopped,
    Running,
}

/// Summary of one iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub time_ms: f64,
    pub model_attached: bool,
    pub fallback_attached: bool,
}

pub struct RenderLoop<S, D> {
    scheduler: S,
    target: D,
    state: LoopState,
    frames: u64,
}

impl<S: FrameScheduler, D: DrawTarget> RenderLoop<S, D> {
    pub fn new(scheduler: S, target: D) -> Self {
        Self {
            scheduler,
            target,
            state: LoopState::Stopped,
            frames: 0,
        }
    }

    /// Arm the first frame; later calls are no-ops
    pub fn start(&mut self) {
        if self.state == LoopState::Running {
            return;
        }
        self.state = LoopState::Running;
        info!("Render loop started");
        self.scheduler.request_frame();
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    /// Run one iteration; a loop that was never started renders nothing
    pub fn frame(&mut self, scene: &mut Scene, time_ms: f64) -> Option<FrameReport> {
        if self.state != LoopState::Running {
            debug!("Frame requested before the loop started");
            return None;
        }

        self.scheduler.request_frame();
        scene.step_objects(time_ms);
        scene.particles.advance(time_ms);
        scene.update_controls();
        self.target.draw(scene);

        self.frames += 1;
        Some(FrameReport {
            frame: self.frames,
            time_ms,
            model_attached: scene.model().is_some(),
            fallback_attached: scene.fallback().is_some(),
        })
    }
}
