//! Background layers: bobbing sparkles and the static star backdrop.

use glam::Vec3;
use rand::Rng;

use crate::config::{SparkleConfig, StarConfig};
use crate::particle::Bounds;
use crate::rotation::Spin;

#[derive(Debug, Clone, PartialEq)]
pub struct Sparkle {
    pub base: Vec3,
    pub position: Vec3,
    pub spin: Spin,
    pub opacity: f32,
}

#[derive(Debug, Clone)]
pub struct Sparkles {
    pub cfg: SparkleConfig,
    pub items: Vec<Sparkle>,
}

impl Sparkles {
    pub fn new<R: Rng + ?Sized>(cfg: SparkleConfig, rng: &mut R) -> Self {
        let bounds = Bounds::cube(cfg.spread.abs());
        let items = (0..cfg.count)
            .map(|_| {
                let base = bounds.sample(rng);
                Sparkle {
                    base,
                    position: base,
                    spin: Spin::new(cfg.spin_speed),
                    opacity: 1.0,
                }
            })
            .collect();
        Self { cfg, items }
    }

    pub fn update(&mut self, dt: f32, time: f32) {
        for (i, sparkle) in self.items.iter_mut().enumerate() {
            sparkle.spin.step(dt);
            // Offset from the base, so the bob never drifts.
            sparkle.position.y = sparkle.base.y + (time + sparkle.base.x).sin() * self.cfg.bob;
            sparkle.opacity = (time * self.cfg.twinkle_speed + i as f32).sin() * 0.3 + 0.7;
        }
    }
}

#[derive(Debug, Clone)]
pub struct StarField {
    pub cfg: StarConfig,
    pub stars: Vec<Vec3>,
    pub spin: Spin,
}

impl StarField {
    pub fn new<R: Rng + ?Sized>(cfg: StarConfig, rng: &mut R) -> Self {
        let bounds = Bounds::cube(cfg.extent.abs());
        let stars = (0..cfg.count).map(|_| bounds.sample(rng)).collect();
        let spin = Spin::new(cfg.spin_speed);
        Self { cfg, stars, spin }
    }

    pub fn update(&mut self, dt: f32) {
        self.spin.step(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn sparkles_bob_around_base() {
        let mut rng = SmallRng::seed_from_u64(1);
        let cfg = SparkleConfig::default();
        let bob = cfg.bob;
        let mut sparkles = Sparkles::new(cfg, &mut rng);
        assert_eq!(sparkles.items.len(), 180);
        for frame in 0..1000 {
            let t = frame as f32 / 60.0;
            sparkles.update(1.0 / 60.0, t);
            for s in &sparkles.items {
                assert!((s.position.y - s.base.y).abs() <= bob + 1e-4);
                assert!((0.4 - 1e-4..=1.0 + 1e-4).contains(&s.opacity));
            }
        }
    }

    #[test]
    fn stars_fill_cube_and_turn() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut stars = StarField::new(StarConfig::default(), &mut rng);
        assert_eq!(stars.stars.len(), 2000);
        assert!(stars.stars.iter().all(|s| s.abs().max_element() <= 50.0));
        stars.update(10.0);
        assert!((stars.spin.angle - 0.06).abs() < 1e-5);
    }
}
