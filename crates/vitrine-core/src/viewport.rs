//! Container dimensions, perspective camera and output surface sizing

use glam::Vec3;

use crate::config::CameraConfig;
use crate::error::SceneError;

/// Logical size of the container the scene is mounted into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Device pixel ratio (physical pixels per logical pixel)
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio,
        }
    }

    /// A viewport the scene can actually be drawn into
    pub fn validated(self) -> Result<Self, SceneError> {
        if self.width == 0 || self.height == 0 {
            return Err(SceneError::EmptyViewport {
                width: self.width,
                height: self.height,
            });
        }
        Ok(self)
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Physical surface size: logical size times device pixel ratio
    pub fn physical_size(&self) -> (u32, u32) {
        let ratio = if self.pixel_ratio > 0.0 { self.pixel_ratio } else { 1.0 };
        (
            (self.width as f32 * ratio).round() as u32,
            (self.height as f32 * ratio).round() as u32,
        )
    }
}

/// Perspective camera parameters
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl PerspectiveCamera {
    /// Camera at (0, 0, 5) looking at the origin
    pub fn from_config(config: &CameraConfig, viewport: &Viewport) -> Self {
        Self {
            fov_degrees: config.fov_degrees,
            aspect: viewport.aspect(),
            near: config.near,
            far: config.far,
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
        }
    }

    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }
}

/// GPU output surface, sized in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSurface {
    pub width: u32,
    pub height: u32,
}

impl RenderSurface {
    pub fn for_viewport(viewport: &Viewport) -> Self {
        let (width, height) = viewport.physical_size();
        Self { width, height }
    }
}
