//! Decorative particle field on a spherical shell
//!
//! Each particle keeps the position it was sampled at and a speed; its
//! current position is recomputed from those two and the clock every frame,
//! so the animation never accumulates error.

use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

pub const SHELL_INNER_RADIUS: f32 = 3.0;
pub const SHELL_OUTER_RADIUS: f32 = 5.0;
pub const MIN_SPEED: f32 = 0.001;
pub const MAX_SPEED: f32 = 0.004;
/// Oscillation amplitude on every axis
pub const AMPLITUDE: f32 = 0.2;

/// Visual parameters shared by every particle
pub const PARTICLE_RADIUS: f32 = 0.02;
pub const PARTICLE_SEGMENTS: u32 = 8;
pub const PARTICLE_COLOR: u32 = 0xd4af37;
pub const PARTICLE_OPACITY: f32 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    origin: Vec3,
    speed: f32,
    pub position: Vec3,
}

impl Particle {
    pub fn new(origin: Vec3, speed: f32) -> Self {
        Self {
            origin,
            speed,
            position: origin,
        }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Position at `time_ms`, independent of any earlier frame
    pub fn position_at(&self, time_ms: f64) -> Vec3 {
        // Reduce the phase in f64 before narrowing; epoch-scale clocks would
        // otherwise lose all precision in f32.
        let phase = time_ms * self.speed as f64;
        let full = (phase % std::f64::consts::TAU) as f32;
        let half = ((phase * 0.5) % std::f64::consts::TAU) as f32;
        self.origin
            + Vec3::new(
                full.sin() * AMPLITUDE,
                full.cos() * AMPLITUDE,
                half.sin() * AMPLITUDE,
            )
    }
}

/// The particle group attached to the scene
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleField {
    particles: Vec<Particle>,
}

impl ParticleField {
    /// Sample `count` particles uniformly over the shell
    ///
    /// Latitude uses the inverse cosine of a uniform variate so particles do
    /// not bunch up at the poles.
    pub fn generate<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let particles = (0..count)
            .map(|_| {
                let theta = rng.gen::<f32>() * TAU;
                let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
                let radius = rng.gen_range(SHELL_INNER_RADIUS..SHELL_OUTER_RADIUS);
                let origin = Vec3::new(
                    radius * phi.sin() * theta.cos(),
                    radius * phi.sin() * theta.sin(),
                    radius * phi.cos(),
                );
                Particle::new(origin, rng.gen_range(MIN_SPEED..MAX_SPEED))
            })
            .collect();
        Self { particles }
    }

    /// Recompute every particle's position for `time_ms`
    pub fn advance(&mut self, time_ms: f64) {
        for particle in &mut self.particles {
            particle.position = particle.position_at(time_ms);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
