//! Fixed three-light rig: ambient fill, shadowed sun, gold key spot

use glam::Vec3;
use std::f32::consts::PI;

/// Split 0xRRGGBB into sRGB components in 0..=1
pub fn srgb_components(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: u32,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: u32,
    pub intensity: f32,
    pub position: Vec3,
    pub cast_shadows: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub color: u32,
    pub intensity: f32,
    pub position: Vec3,
    /// Half-angle of the cone in radians
    pub angle: f32,
    /// Fraction of the cone that fades out toward its edge
    pub penumbra: f32,
    pub decay: f32,
    pub range: f32,
    pub cast_shadows: bool,
}

impl SpotLight {
    /// Angle at which the falloff starts
    pub fn inner_angle(&self) -> f32 {
        self.angle * (1.0 - self.penumbra)
    }
}

/// The lights composed into every scene; created once and never mutated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingRig {
    pub ambient: AmbientLight,
    pub sun: DirectionalLight,
    pub key: SpotLight,
}

impl Default for LightingRig {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: 0xffffff,
                intensity: 0.4,
            },
            sun: DirectionalLight {
                color: 0xffffff,
                intensity: 0.8,
                position: Vec3::new(5.0, 10.0, 7.0),
                cast_shadows: true,
            },
            key: SpotLight {
                color: 0xd4af37,
                intensity: 1.0,
                position: Vec3::new(0.0, 5.0, 10.0),
                angle: PI / 6.0,
                penumbra: 0.1,
                decay: 2.0,
                range: 50.0,
                cast_shadows: true,
            },
        }
    }
}

impl LightingRig {
    pub fn light_count(&self) -> usize {
        3
    }

    pub fn shadow_casters(&self) -> usize {
        usize::from(self.sun.cast_shadows) + usize::from(self.key.cast_shadows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_components() {
        assert_eq!(srgb_components(0xffffff), [1.0, 1.0, 1.0]);
        assert_eq!(srgb_components(0x000000), [0.0, 0.0, 0.0]);
        let gold = srgb_components(0xd4af37);
        assert!((gold[0] - 212.0 / 255.0).abs() < 1e-6);
        assert!((gold[1] - 175.0 / 255.0).abs() < 1e-6);
        assert!((gold[2] - 55.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_rig_shadow_casters() {
        let rig = LightingRig::default();
        assert_eq!(rig.light_count(), 3);
        assert_eq!(rig.shadow_casters(), 2);
        assert!((rig.key.inner_angle() - PI / 6.0 * 0.9).abs() < 1e-6);
    }
}
