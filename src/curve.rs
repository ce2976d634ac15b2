//! Parametric shapes the field seeds its entities from.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::Rng;

/// The classic heart curve, `t` in `[0, 2π)`. Spans roughly ±16 in x and
/// -17..12 in y.
pub fn heart(t: f32) -> Vec2 {
    let s = t.sin();
    let x = 16.0 * s * s * s;
    let y = 13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos();
    Vec2::new(x, y)
}

/// `count` points evenly spaced in the curve parameter.
pub fn sample_evenly(count: usize) -> Vec<Vec2> {
    (0..count)
        .map(|i| heart(i as f32 / count as f32 * TAU))
        .collect()
}

/// Random sampler over the heart outline and interior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSampler {
    pub count: usize,
    /// Radial exponent; `r = u^bias`. Values below 1 crowd samples toward
    /// the outline, 1 is uniform in `r`.
    pub bias: f32,
    /// Radius of the random offset added after scaling.
    pub jitter: f32,
    pub scale: f32,
    /// Total z thickness of the generated slab.
    pub depth: f32,
}

impl CurveSampler {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Vec3> {
        (0..self.count).map(|_| self.sample_one(rng)).collect()
    }

    pub fn sample_one<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let t = rng.gen_range(0.0..TAU);
        let r = rng.gen::<f32>().powf(self.bias);
        let p = heart(t) * r * self.scale;
        let half_depth = self.depth * 0.5;
        let z = if half_depth > 0.0 {
            rng.gen_range(-half_depth..half_depth)
        } else {
            0.0
        };
        Vec3::new(p.x, p.y, z) + jitter(rng, self.jitter)
    }
}

/// Uniform offset inside the ball of `radius`.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vec3 {
    if radius <= 0.0 {
        return Vec3::ZERO;
    }
    loop {
        let v = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if v.length_squared() <= 1.0 {
            return v * radius;
        }
    }
}

/// Position of label `index` of `count` on a sphere. The polar angle walks
/// from the north pole, the azimuth advances by a full turn over the set.
pub fn sphere_point(index: usize, count: usize, radius: f32, theta_offset: f32) -> Vec3 {
    if count == 0 {
        return Vec3::ZERO;
    }
    let frac = index as f32 / count as f32;
    let theta = (frac * TAU + theta_offset).rem_euclid(TAU);
    let phi = (1.0 - 2.0 * frac).clamp(-1.0, 1.0).acos();
    Vec3::new(
        radius * phi.sin() * theta.cos(),
        radius * phi.sin() * theta.sin(),
        radius * phi.cos(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn heart_is_mirror_symmetric() {
        for i in 1..360 {
            let t = i as f32 / 360.0 * TAU;
            let a = heart(t);
            let b = heart(TAU - t);
            assert!((a.x + b.x).abs() < 1e-3, "x at t={t}: {a:?} vs {b:?}");
            assert!((a.y - b.y).abs() < 1e-3, "y at t={t}: {a:?} vs {b:?}");
        }
    }

    #[test]
    fn heart_top_and_cusp() {
        // t = 0 is the top notch, t = π the bottom tip.
        let top = heart(0.0);
        assert!(top.x.abs() < 1e-6);
        assert!((top.y - 5.0).abs() < 1e-4);
        let tip = heart(std::f32::consts::PI);
        assert!((tip.y + 17.0).abs() < 1e-4);
    }

    #[test]
    fn sampler_respects_scale_and_jitter() {
        let mut rng = SmallRng::seed_from_u64(7);
        let sampler = CurveSampler {
            count: 500,
            bias: 0.5,
            jitter: 0.1,
            scale: 0.05,
            depth: 0.5,
        };
        let points = sampler.sample(&mut rng);
        assert_eq!(points.len(), 500);
        for p in points {
            assert!(p.x.abs() <= 16.0 * 0.05 + 0.1 + 1e-4);
            assert!(p.y <= 13.0 * 0.05 + 0.1 && p.y >= -17.0 * 0.05 - 0.1);
            assert!(p.z.abs() <= 0.25 + 0.1 + 1e-4);
        }
    }

    #[test]
    fn low_bias_pushes_samples_outward() {
        let mean_distance = |bias: f32| {
            let mut rng = SmallRng::seed_from_u64(99);
            let sampler = CurveSampler {
                count: 4000,
                bias,
                jitter: 0.0,
                scale: 1.0,
                depth: 0.0,
            };
            let points = sampler.sample(&mut rng);
            points.iter().map(|p| p.length()).sum::<f32>() / points.len() as f32
        };
        assert!(mean_distance(0.3) > mean_distance(1.0));
    }

    #[test]
    fn jitter_stays_in_ball() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..1000 {
            assert!(jitter(&mut rng, 0.5).length() <= 0.5 + 1e-5);
        }
        assert_eq!(jitter(&mut rng, 0.0), Vec3::ZERO);
    }

    #[test]
    fn sphere_three_labels() {
        let r = 20.0;
        let p0 = sphere_point(0, 3, r, 0.0);
        assert!(p0.truncate().length() < 1e-4);
        assert!((p0.z - r).abs() < 1e-4);

        for (i, p) in (0..3).map(|i| (i, sphere_point(i, 3, r, 0.0))) {
            assert!((p.length() - r).abs() < 1e-3);
            let theta = i as f32 / 3.0 * TAU;
            let phi = (1.0 - 2.0 * i as f32 / 3.0).acos();
            assert!((p.x - r * phi.sin() * theta.cos()).abs() < 1e-4);
            assert!((p.y - r * phi.sin() * theta.sin()).abs() < 1e-4);
        }
    }

    #[test]
    fn even_samples_start_at_top() {
        let pts = sample_evenly(4);
        assert_eq!(pts.len(), 4);
        assert!((pts[0] - heart(0.0)).length() < 1e-6);
        assert!((pts[2] - heart(std::f32::consts::PI)).length() < 1e-4);
    }
}
