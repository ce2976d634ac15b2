//! Scene state: every generated layer plus the shared clock and rng.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::clock::Tick;
use crate::color::Color;
use glam::Vec3;

use crate::config::{CloudLayout, FieldConfig, HeartCloudConfig};
use crate::curve::{self, CurveSampler};
use crate::falling::{HeartRain, TextRain};
use crate::orbit::TextSphere;
use crate::particle::{Bounds, ParticlePool, ParticleSpec};
use crate::rotation::Spin;
use crate::sparkle::{Sparkles, StarField};

/// Point cloud sampled from the heart curve, turning about Y as a group.
#[derive(Debug, Clone)]
pub struct HeartCloud {
    pub cfg: HeartCloudConfig,
    pub sampler: CurveSampler,
    pub spec: ParticleSpec,
    pub pool: ParticlePool,
    pub spin: Spin,
}

impl HeartCloud {
    /// Only the `sampled` layout with a per-frame budget starts empty; the
    /// other layouts generate their whole batch here.
    pub fn new<R: Rng + ?Sized>(cfg: HeartCloudConfig, rng: &mut R) -> Self {
        let sampler = CurveSampler {
            count: cfg.count,
            bias: cfg.bias,
            jitter: 0.0,
            scale: cfg.scale,
            depth: cfg.depth,
        };
        let spec = ParticleSpec::from(&cfg);
        let pool = match cfg.layout {
            CloudLayout::Sampled if cfg.spawn_per_frame > 0 => ParticlePool::with_target(cfg.count),
            CloudLayout::Sampled => ParticlePool::from_points(&sampler.sample(rng), 1, &spec, rng),
            CloudLayout::Outline { points, per_point } => {
                let outline: Vec<Vec3> = curve::sample_evenly(points)
                    .into_iter()
                    .map(|p| (p * cfg.scale).extend(0.0))
                    .collect();
                ParticlePool::from_points(&outline, per_point, &spec, rng)
            }
            CloudLayout::Scatter { half_extent } => {
                ParticlePool::scatter(&Bounds::cube(half_extent.abs()), cfg.count, &spec, rng)
            }
        };
        Self {
            sampler,
            spec,
            pool,
            spin: Spin::new(cfg.spin_speed),
            cfg,
        }
    }

    fn step(&mut self, tick: Tick, rng: &mut SmallRng) -> StepStats {
        let sampler = self.sampler;
        let spawned = self
            .pool
            .top_up(self.cfg.spawn_per_frame, &self.spec, rng, |rng| sampler.sample_one(rng));
        let respawned = self.pool.update(tick.frames, rng);
        self.spin.step(tick.dt);
        StepStats { spawned, respawned }
    }
}

/// Bookkeeping returned from [`Field::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    pub spawned: usize,
    pub respawned: usize,
}

impl std::ops::AddAssign for StepStats {
    fn add_assign(&mut self, rhs: Self) {
        self.spawned += rhs.spawned;
        self.respawned += rhs.respawned;
    }
}

/// Everything the frame callback owns.
#[derive(Debug, Clone)]
pub struct Field {
    /// Seconds of simulated time since generation.
    pub time: f32,
    pub frame: u64,
    pub background: Color,
    pub heart_cloud: Option<HeartCloud>,
    pub text_rain: Option<TextRain>,
    pub heart_rain: Option<HeartRain>,
    pub sparkles: Option<Sparkles>,
    pub stars: Option<StarField>,
    pub text_sphere: Option<TextSphere>,
    rng: SmallRng,
}

impl Field {
    pub fn new(config: &FieldConfig, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let field = Self {
            time: 0.0,
            frame: 0,
            background: config.background,
            heart_cloud: config.heart_cloud.clone().map(|c| HeartCloud::new(c, &mut rng)),
            text_rain: config.text_rain.clone().map(|c| TextRain::new(c, &mut rng)),
            heart_rain: config.heart_rain.clone().map(|c| HeartRain::new(c, &mut rng)),
            sparkles: config.sparkles.clone().map(|c| Sparkles::new(c, &mut rng)),
            stars: config.stars.clone().map(|c| StarField::new(c, &mut rng)),
            text_sphere: config.text_sphere.clone().map(TextSphere::new),
            rng,
        };
        log::debug!(
            "generated field (seed {seed}): {} entities",
            field.entity_count()
        );
        field
    }

    /// Advance every layer by one frame: top-up, then the per-entity rules.
    pub fn step(&mut self, tick: Tick) -> StepStats {
        self.time += tick.dt;
        self.frame += 1;
        let time = self.time;
        let rng = &mut self.rng;
        let mut stats = StepStats::default();

        if let Some(cloud) = &mut self.heart_cloud {
            stats += cloud.step(tick, rng);
        }
        if let Some(rain) = &mut self.text_rain {
            stats.respawned += rain.update(tick.dt, tick.frames, time, rng);
        }
        if let Some(rain) = &mut self.heart_rain {
            stats.respawned += rain.update(tick.dt, tick.frames, time, rng);
        }
        if let Some(sparkles) = &mut self.sparkles {
            sparkles.update(tick.dt, time);
        }
        if let Some(stars) = &mut self.stars {
            stars.update(tick.dt);
        }
        if let Some(sphere) = &mut self.text_sphere {
            sphere.update(time);
        }
        stats
    }

    pub fn entity_count(&self) -> usize {
        self.heart_cloud.as_ref().map_or(0, |c| c.pool.len())
            + self.text_rain.as_ref().map_or(0, |r| r.labels.len())
            + self.heart_rain.as_ref().map_or(0, |r| r.hearts.len())
            + self.sparkles.as_ref().map_or(0, |s| s.items.len())
            + self.stars.as_ref().map_or(0, |s| s.stars.len())
            + self.text_sphere.as_ref().map_or(0, |s| s.labels.len())
    }

    /// Rough scene radius, used to aim the camera's far plane.
    pub fn extent(&self) -> f32 {
        let stars = self.stars.as_ref().map_or(0.0, |s| s.cfg.extent * 3f32.sqrt());
        let sphere = self.text_sphere.as_ref().map_or(0.0, |s| s.cfg.radius);
        stars.max(sphere).max(30.0)
    }
}
