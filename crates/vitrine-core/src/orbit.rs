//! Orbit camera controller with damping and clamps
//!
//! Pointer input moves a *target* spherical state; [`OrbitController::update`]
//! eases the current state toward it once per frame. The orbit centre is fixed
//! (panning is disabled) and Y is up.

use glam::Vec3;
use std::f32::consts::TAU;

use crate::config::CameraConfig;

/// Keeps the polar angle off the pole so the view basis stays defined
const POLE_EPSILON: f32 = 1e-6;

/// Wheel zoom factor per notch
const ZOOM_STEP: f32 = 0.95;

/// Distance and polar-angle limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitLimits {
    pub min_distance: f32,
    pub max_distance: f32,
    /// Radians from +Y
    pub max_polar: f32,
}

impl OrbitLimits {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            max_polar: config.max_polar_degrees.to_radians(),
        }
    }

    fn clamp_distance(&self, distance: f32) -> f32 {
        distance.clamp(self.min_distance, self.max_distance)
    }

    fn clamp_polar(&self, polar: f32) -> f32 {
        polar.clamp(POLE_EPSILON, self.max_polar.max(POLE_EPSILON))
    }
}

/// Spherical orbit state around a fixed focus point
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitController {
    pub focus: Vec3,
    pub azimuth: f32,
    pub polar: f32,
    pub distance: f32,
    target_azimuth: f32,
    target_polar: f32,
    target_distance: f32,
    pub damping: f32,
    pub rotate_speed: f32,
    pub limits: OrbitLimits,
}

impl OrbitController {
    /// Derive the spherical state from an initial camera position
    pub fn new(position: Vec3, focus: Vec3, config: &CameraConfig) -> Self {
        let limits = OrbitLimits::from_config(config);
        let offset = position - focus;
        let distance = limits.clamp_distance(offset.length());
        let (azimuth, polar) = if offset.length_squared() > 0.0 {
            (
                offset.x.atan2(offset.z),
                limits.clamp_polar((offset.y / offset.length()).clamp(-1.0, 1.0).acos()),
            )
        } else {
            (0.0, limits.clamp_polar(std::f32::consts::FRAC_PI_2))
        };

        Self {
            focus,
            azimuth,
            polar,
            distance,
            target_azimuth: azimuth,
            target_polar: polar,
            target_distance: distance,
            damping: config.damping,
            rotate_speed: 1.0,
            limits,
        }
    }

    /// Pointer drag in logical pixels; a drag of the full viewport height turns a full circle
    pub fn rotate_by_pointer(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.target_azimuth -= TAU * dx / height * self.rotate_speed;
        self.target_polar = self
            .limits
            .clamp_polar(self.target_polar - TAU * dy / height * self.rotate_speed);
    }

    /// Wheel zoom; positive notches move the camera closer
    pub fn zoom_by_steps(&mut self, notches: f32) {
        self.zoom_by_scale(ZOOM_STEP.powf(notches));
    }

    /// Multiply the target distance (pinch gestures)
    pub fn zoom_by_scale(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.target_distance = self.limits.clamp_distance(self.target_distance * scale);
        }
    }

    /// Ease the current state toward the target; call once per rendered frame
    pub fn update(&mut self) -> Vec3 {
        let k = self.damping;
        self.azimuth += (self.target_azimuth - self.azimuth) * k;
        self.polar = self
            .limits
            .clamp_polar(self.polar + (self.target_polar - self.polar) * k);
        self.distance = self
            .limits
            .clamp_distance(self.distance + (self.target_distance - self.distance) * k);
        self.camera_position()
    }

    pub fn camera_position(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.focus
            + self.distance
                * Vec3::new(
                    sin_polar * self.azimuth.sin(),
                    self.polar.cos(),
                    sin_polar * self.azimuth.cos(),
                )
    }

    pub fn target_distance(&self) -> f32 {
        self.target_distance
    }

    pub fn target_polar(&self) -> f32 {
        self.target_polar
    }

    pub fn target_azimuth(&self) -> f32 {
        self.target_azimuth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> OrbitController {
        OrbitController::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, &CameraConfig::default())
    }

    fn within_limits(c: &OrbitController) -> bool {
        (3.0..=10.0).contains(&c.distance)
            && (3.0..=10.0).contains(&c.target_distance())
            && c.polar >= 0.0
            && c.polar <= 120f32.to_radians() + 1e-6
            && c.target_polar() <= 120f32.to_radians() + 1e-6
    }

    #[test]
    fn test_initial_state_matches_camera_position() {
        let c = controller();
        assert!((c.distance - 5.0).abs() < 1e-5);
        assert!((c.polar - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert!(c.azimuth.abs() < 1e-5);
        assert!(c.camera_position().distance(Vec3::new(0.0, 0.0, 5.0)) < 1e-4);
    }

    #[test]
    fn test_clamps_hold_under_arbitrary_input() {
        let mut c = controller();
        let inputs: [(f32, f32, f32); 8] = [
            (500.0, 900.0, 40.0),
            (-2000.0, -3000.0, -60.0),
            (10.0, 4000.0, 3.0),
            (0.0, -10.0, -200.0),
            (1.0e6, 1.0e6, 1.0e3),
            (-7.5, 33.0, 0.5),
            (0.0, 0.0, -1.0e3),
            (42.0, -1.0e5, 12.0),
        ];
        for (dx, dy, notches) in inputs {
            c.rotate_by_pointer(dx, dy, 600.0);
            c.zoom_by_steps(notches);
            for _ in 0..30 {
                c.update();
                assert!(within_limits(&c), "out of limits: {:?}", c);
            }
        }
    }

    #[test]
    fn test_damping_approaches_target_gradually() {
        let mut c = controller();
        c.rotate_by_pointer(60.0, 0.0, 600.0);
        let target = c.target_azimuth();

        c.update();
        let first = (c.azimuth - target).abs();
        assert!((first - target.abs() * 0.95).abs() < 1e-5, "one step covers 5% of the gap");

        for _ in 0..400 {
            c.update();
        }
        assert!((c.azimuth - target).abs() < 1e-4);
    }

    #[test]
    fn test_zoom_clamped_to_distance_range() {
        let mut c = controller();
        c.zoom_by_scale(100.0);
        assert_eq!(c.target_distance(), 10.0);
        c.zoom_by_scale(0.0001);
        assert_eq!(c.target_distance(), 3.0);
        c.zoom_by_scale(f32::NAN);
        assert_eq!(c.target_distance(), 3.0);
    }

    #[test]
    fn test_camera_stays_on_orbit_sphere() {
        let mut c = controller();
        c.rotate_by_pointer(123.0, -45.0, 600.0);
        for _ in 0..50 {
            let position = c.update();
            assert!((position.length() - c.distance).abs() < 1e-4);
        }
    }
}
