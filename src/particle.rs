//! Pooled point particles that fade out and respawn around their origin.

use glam::Vec3;
use rand::Rng;

use crate::color::Color;
use crate::config::{HeartCloudConfig, Interval};
use crate::curve;

/// Life at or below this is treated as expired. Absorbs the rounding left
/// over from repeatedly subtracting a decimal decay step.
const LIFE_EPSILON: f32 = 1e-4;

/// Fixed ranges the batch generator draws secondary attributes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleSpec {
    pub size: Interval,
    pub speed: Interval,
    pub decay: Interval,
    /// Respawn offset radius around the reference point.
    pub jitter: f32,
    pub color: Color,
}

impl From<&HeartCloudConfig> for ParticleSpec {
    fn from(cfg: &HeartCloudConfig) -> Self {
        Self {
            size: cfg.size,
            speed: cfg.speed,
            decay: cfg.decay,
            jitter: cfg.jitter,
            color: cfg.color,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    /// Units per nominal frame.
    pub velocity: Vec3,
    pub size: f32,
    pub color: Color,
    /// Fraction of life remaining, always in `[0, 1]`.
    pub life: f32,
    /// Life lost per nominal frame.
    pub decay: f32,
    pub reference: Vec3,
    pub jitter: f32,
    speed: Interval,
}

impl Particle {
    pub fn spawn<R: Rng + ?Sized>(reference: Vec3, spec: &ParticleSpec, rng: &mut R) -> Self {
        let mut particle = Self {
            position: reference,
            velocity: Vec3::ZERO,
            size: spec.size.sample(rng),
            color: spec.color,
            life: 1.0,
            decay: spec.decay.sample(rng).max(0.0),
            reference,
            jitter: spec.jitter,
            speed: spec.speed,
        };
        particle.respawn(rng);
        particle
    }

    /// Advance by `frames` nominal frames. Returns `true` when the particle
    /// was recycled on this step.
    ///
    /// An expired particle is recycled on the step after the one that
    /// drained it, so its zero-life state is observable for one frame.
    pub fn update<R: Rng + ?Sized>(&mut self, frames: f32, rng: &mut R) -> bool {
        if self.life <= 0.0 {
            self.respawn(rng);
            return true;
        }
        self.life -= self.decay * frames;
        if self.life <= LIFE_EPSILON {
            self.life = 0.0;
        }
        self.position += self.velocity * frames;
        false
    }

    fn respawn<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.position = self.reference + curve::jitter(rng, self.jitter);
        self.velocity = curve::jitter(rng, 1.0).normalize_or_zero() * self.speed.sample(rng);
        self.life = 1.0;
    }

    pub fn opacity(&self) -> f32 {
        self.life
    }
}

/// Axis-aligned box for uniform scatter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn cube(half: f32) -> Self {
        Self {
            min: Vec3::splat(-half),
            max: Vec3::splat(half),
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        Vec3::new(
            Interval::new(self.min.x, self.max.x).sample(rng),
            Interval::new(self.min.y, self.max.y).sample(rng),
            Interval::new(self.min.z, self.max.z).sample(rng),
        )
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Particles owned by one batch. Records are recycled in place; once the
/// pool is full it never grows or shrinks.
#[derive(Debug, Clone, Default)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    target: usize,
}

impl ParticlePool {
    pub fn with_target(target: usize) -> Self {
        Self {
            particles: Vec::with_capacity(target),
            target,
        }
    }

    /// `per_point` particles for every seed point, each anchored to it.
    pub fn from_points<R: Rng + ?Sized>(
        points: &[Vec3],
        per_point: usize,
        spec: &ParticleSpec,
        rng: &mut R,
    ) -> Self {
        let mut pool = Self::with_target(points.len() * per_point);
        for &point in points {
            for _ in 0..per_point {
                pool.particles.push(Particle::spawn(point, spec, rng));
            }
        }
        pool
    }

    /// `count` particles anchored at uniform points inside `bounds`.
    pub fn scatter<R: Rng + ?Sized>(
        bounds: &Bounds,
        count: usize,
        spec: &ParticleSpec,
        rng: &mut R,
    ) -> Self {
        let points: Vec<Vec3> = (0..count).map(|_| bounds.sample(rng)).collect();
        Self::from_points(&points, 1, spec, rng)
    }

    /// Add up to `budget` particles seeded from `source`, stopping at the
    /// target count. Returns how many were added.
    pub fn top_up<R, F>(&mut self, budget: usize, spec: &ParticleSpec, rng: &mut R, mut source: F) -> usize
    where
        R: Rng + ?Sized,
        F: FnMut(&mut R) -> Vec3,
    {
        let missing = self.target.saturating_sub(self.particles.len());
        let n = missing.min(budget);
        for _ in 0..n {
            let reference = source(rng);
            self.particles.push(Particle::spawn(reference, spec, rng));
        }
        n
    }

    /// Returns the number of particles recycled this step.
    pub fn update<R: Rng + ?Sized>(&mut self, frames: f32, rng: &mut R) -> usize {
        self.particles
            .iter_mut()
            .map(|p| p.update(frames, rng))
            .filter(|&respawned| respawned)
            .count()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.particles.len() >= self.target
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }
}
