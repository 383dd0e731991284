//! Easing curves, the one-shot model entrance and per-frame spins

use std::f32::consts::TAU;

/// Idle turn applied to a loaded model every frame, radians about Y
pub const MODEL_IDLE_SPIN: f32 = 0.003;
/// Fallback knot spin per frame, radians about X and Y
pub const FALLBACK_SPIN: [f32; 2] = [0.01, 0.02];

pub const ENTRANCE_ROTATION_MS: f64 = 2000.0;
pub const ENTRANCE_RISE_MS: f64 = 1500.0;
/// Height the model rises from
pub const ENTRANCE_START_Y: f32 = -5.0;

/// Cubic ease-out (GSAP `power2.out`)
pub fn power2_out(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

/// Piecewise-quadratic bounce settling at 1 (GSAP `bounce.out`)
pub fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    let t = t.clamp(0.0, 1.0);
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

/// Progress of a tween in 0..=1
fn progress(started_ms: f64, now_ms: f64, duration_ms: f64) -> f32 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    ((now_ms - started_ms) / duration_ms).clamp(0.0, 1.0) as f32
}

/// Where the entrance puts the model at a given instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntranceSample {
    /// Extra rotation about Y on top of the resting rotation
    pub rotation_offset: f32,
    pub y: f32,
    pub finished: bool,
}

/// One-shot entrance: a full turn easing out over 2s while the model
/// bounces up into its resting height over 1.5s
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntranceAnimation {
    pub started_ms: f64,
    pub rest_y: f32,
}

impl EntranceAnimation {
    pub fn new(started_ms: f64, rest_y: f32) -> Self {
        Self { started_ms, rest_y }
    }

    pub fn sample(&self, now_ms: f64) -> EntranceSample {
        let turn = progress(self.started_ms, now_ms, ENTRANCE_ROTATION_MS);
        let rise = progress(self.started_ms, now_ms, ENTRANCE_RISE_MS);

        EntranceSample {
            rotation_offset: TAU * (1.0 - power2_out(turn)),
            y: ENTRANCE_START_Y + (self.rest_y - ENTRANCE_START_Y) * bounce_out(rise),
            finished: turn >= 1.0 && rise >= 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_endpoints() {
        for ease in [power2_out as fn(f32) -> f32, bounce_out] {
            assert!(ease(0.0).abs() < 1e-6);
            assert!((ease(1.0) - 1.0).abs() < 1e-6);
            assert!((ease(2.0) - 1.0).abs() < 1e-6);
            assert!(ease(-1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_power2_out_is_monotonic() {
        let mut last = 0.0;
        for i in 1..=100 {
            let value = power2_out(i as f32 / 100.0);
            assert!(value >= last);
            last = value;
        }
        assert!((power2_out(0.5) - 0.875).abs() < 1e-6);
    }

    #[test]
    fn test_bounce_out_stays_in_range() {
        for i in 0..=1000 {
            let value = bounce_out(i as f32 / 1000.0);
            assert!((0.0..=1.0 + 1e-6).contains(&value), "bounce {}", value);
        }
    }

    #[test]
    fn test_entrance_starts_low_and_turned() {
        let entrance = EntranceAnimation::new(1000.0, -1.0);
        let start = entrance.sample(1000.0);
        assert!((start.rotation_offset - TAU).abs() < 1e-5);
        assert!((start.y - ENTRANCE_START_Y).abs() < 1e-5);
        assert!(!start.finished);
    }

    #[test]
    fn test_entrance_ends_at_rest() {
        let entrance = EntranceAnimation::new(1000.0, -1.0);

        let risen = entrance.sample(2500.0);
        assert!((risen.y + 1.0).abs() < 1e-5);
        assert!(risen.rotation_offset > 0.0);
        assert!(!risen.finished);

        let done = entrance.sample(3000.0);
        assert_eq!(done.rotation_offset, 0.0);
        assert!((done.y + 1.0).abs() < 1e-5);
        assert!(done.finished);
        assert_eq!(entrance.sample(1.0e9), done);
    }
}
