//! Rotation integrators: bounded back-and-forth tilt and free spin.

use std::f32::consts::TAU;

use glam::Vec3;

/// Per-axis rotation that reverses direction instead of crossing its bound.
///
/// A step whose result would exceed `|max|` on an axis flips that axis'
/// speed and leaves the angle where it was, so `|angle| <= |max|` holds
/// after any number of steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceRotation {
    pub angle: Vec3,
    pub speed: Vec3,
    pub max: Vec3,
}

impl BounceRotation {
    pub fn new(speed: Vec3, max: Vec3) -> Self {
        Self {
            angle: Vec3::ZERO,
            speed,
            max: max.abs(),
        }
    }

    pub fn step(&mut self, scale: f32) {
        let next = self.angle + self.speed * scale;
        for axis in 0..3 {
            if next[axis].abs() > self.max[axis] {
                self.speed[axis] = -self.speed[axis];
            } else {
                self.angle[axis] = next[axis];
            }
        }
    }

    pub fn reset(&mut self) {
        self.angle = Vec3::ZERO;
    }
}

/// Unbounded rotation about a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spin {
    pub angle: f32,
    /// Radians per second.
    pub speed: f32,
}

impl Spin {
    pub fn new(speed: f32) -> Self {
        Self { angle: 0.0, speed }
    }

    pub fn step(&mut self, dt: f32) {
        // Wrapped to keep precision; visually identical to free accumulation.
        self.angle = (self.angle + self.speed * dt).rem_euclid(TAU);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounce_never_exceeds_bound() {
        let mut rot = BounceRotation::new(Vec3::new(0.013, -0.021, 0.4), Vec3::new(0.087, 0.05, 0.3));
        for _ in 0..100_000 {
            rot.step(1.0);
            for axis in 0..3 {
                assert!(rot.angle[axis].abs() <= rot.max[axis]);
            }
        }
    }

    #[test]
    fn bounce_reverses_at_bound() {
        let mut rot = BounceRotation::new(Vec3::new(0.04, 0.0, 0.0), Vec3::new(0.1, 0.0, 0.0));
        rot.step(1.0);
        rot.step(1.0);
        assert!((rot.angle.x - 0.08).abs() < 1e-6);
        rot.step(1.0);
        // 0.12 would overshoot: speed flips, angle holds.
        assert!((rot.angle.x - 0.08).abs() < 1e-6);
        assert!(rot.speed.x < 0.0);
        rot.step(1.0);
        assert!((rot.angle.x - 0.04).abs() < 1e-6);
    }

    #[test]
    fn negative_max_is_treated_as_magnitude() {
        let rot = BounceRotation::new(Vec3::ONE, Vec3::new(-0.05, 0.02, -0.01));
        assert_eq!(rot.max, Vec3::new(0.05, 0.02, 0.01));
    }

    #[test]
    fn spin_wraps() {
        let mut spin = Spin::new(1.0);
        for _ in 0..1000 {
            spin.step(0.1);
        }
        assert!(spin.angle >= 0.0 && spin.angle < TAU);
        let expected = (100.0f32).rem_euclid(TAU);
        assert!((spin.angle - expected).abs() < 1e-2);
    }
}
