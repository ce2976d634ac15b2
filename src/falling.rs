//! Captions and hearts that drift down through the scene and get recycled
//! above it once they leave the bottom.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;

use crate::config::{FallConfig, HeartRainConfig, TextRainConfig};
use crate::rotation::{BounceRotation, Spin};

/// Horizontal sway: `sin(time * speed + phase) * amount`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sway {
    pub speed: f32,
    pub amount: f32,
    pub phase: f32,
}

impl Sway {
    fn random<R: Rng + ?Sized>(cfg: &FallConfig, rng: &mut R) -> Self {
        Self {
            speed: cfg.sway_speed.sample(rng),
            amount: cfg.sway_amount.sample(rng),
            phase: rng.gen_range(0.0..TAU),
        }
    }

    pub fn offset(&self, time: f32) -> f32 {
        (time * self.speed + self.phase).sin() * self.amount
    }
}

/// Outcome of one [`Faller::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Still inside its start delay.
    Waiting,
    Moved,
    /// Crossed the floor last step and was moved back above the ceiling.
    Respawned,
}

/// Vertical fall with start delay, sway and reset-on-exit.
#[derive(Debug, Clone, PartialEq)]
pub struct Faller {
    pub position: Vec3,
    pub base_x: f32,
    pub base_z: f32,
    /// Units per nominal frame.
    pub fall_speed: f32,
    pub sway: Sway,
    /// Seconds to wait before moving.
    pub start_delay: f32,
    /// Seconds since spawn, on this entity's own clock.
    pub elapsed: f32,
}

impl Faller {
    /// Initial placement; entity `index` starts `index * stagger` seconds late.
    pub fn spawn<R: Rng + ?Sized>(index: usize, cfg: &FallConfig, rng: &mut R) -> Self {
        let mut faller = Self {
            position: Vec3::ZERO,
            base_x: 0.0,
            base_z: 0.0,
            fall_speed: 0.0,
            sway: Sway::random(cfg, rng),
            start_delay: 0.0,
            elapsed: 0.0,
        };
        faller.respawn(cfg, rng);
        faller.start_delay = index as f32 * cfg.stagger;
        faller
    }

    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        frames: f32,
        cfg: &FallConfig,
        rng: &mut R,
    ) -> Motion {
        if self.position.y < cfg.floor {
            self.respawn(cfg, rng);
            return Motion::Respawned;
        }
        self.elapsed += dt;
        if self.elapsed <= self.start_delay {
            return Motion::Waiting;
        }
        self.position.y -= self.fall_speed * frames;
        self.position.x = self.base_x + self.sway.offset(self.elapsed);
        Motion::Moved
    }

    fn respawn<R: Rng + ?Sized>(&mut self, cfg: &FallConfig, rng: &mut R) {
        let spread = cfg.spread.abs();
        self.base_x = rng.gen_range(-spread..=spread);
        self.base_z = rng.gen_range(-spread..=spread);
        self.fall_speed = cfg.fall_speed.sample(rng);
        self.sway = Sway::random(cfg, rng);
        self.elapsed = 0.0;
        self.start_delay = cfg.respawn_delay.sample(rng);
        self.position = Vec3::new(
            self.base_x + self.sway.offset(0.0),
            cfg.spawn_height.sample(rng),
            self.base_z,
        );
    }
}

/// Small glyph hung next to a caption.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoration {
    pub offset: Vec3,
}

impl Decoration {
    fn random<R: Rng + ?Sized>(radius: f32, rng: &mut R) -> Self {
        let angle = rng.gen_range(0.0..TAU);
        let r = radius * rng.gen_range(0.6..=1.0);
        Self {
            offset: Vec3::new(angle.cos() * r, angle.sin() * r * 0.5, rng.gen_range(-0.2..=0.2)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FallingText {
    pub faller: Faller,
    /// Index into the configured messages.
    pub message: usize,
    pub size: f32,
    pub rotation: BounceRotation,
    pub twinkle_phase: f32,
    pub opacity: f32,
    pub decorations: Vec<Decoration>,
}

impl FallingText {
    fn spawn<R: Rng + ?Sized>(index: usize, cfg: &TextRainConfig, rng: &mut R) -> Self {
        let speed = Vec3::splat(cfg.rotation_speed);
        let max = Vec3::new(
            cfg.max_rotation.sample(rng),
            cfg.max_rotation.sample(rng),
            cfg.max_rotation.sample(rng),
        );
        let decorations = match cfg.decoration {
            Some(_) => (0..cfg.decorations_per_label)
                .map(|_| Decoration::random(cfg.decoration_radius, rng))
                .collect(),
            None => Vec::new(),
        };
        Self {
            faller: Faller::spawn(index, &cfg.fall, rng),
            message: rng.gen_range(0..cfg.messages.len().max(1)),
            size: cfg.size.sample(rng),
            rotation: BounceRotation::new(speed, max),
            twinkle_phase: index as f32,
            opacity: 1.0,
            decorations,
        }
    }

    fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        frames: f32,
        time: f32,
        cfg: &TextRainConfig,
        rng: &mut R,
    ) -> Motion {
        let motion = self.faller.update(dt, frames, &cfg.fall, rng);
        match motion {
            Motion::Respawned => {
                self.rotation.reset();
                self.message = rng.gen_range(0..cfg.messages.len().max(1));
                for decoration in &mut self.decorations {
                    *decoration = Decoration::random(cfg.decoration_radius, rng);
                }
            }
            Motion::Moved => self.rotation.step(frames),
            Motion::Waiting => {}
        }
        self.opacity = (time * cfg.twinkle_speed + self.twinkle_phase).sin() * 0.3 + 0.7;
        motion
    }
}

/// All falling captions of one scene.
#[derive(Debug, Clone)]
pub struct TextRain {
    pub cfg: TextRainConfig,
    pub labels: Vec<FallingText>,
}

impl TextRain {
    pub fn new<R: Rng + ?Sized>(cfg: TextRainConfig, rng: &mut R) -> Self {
        let labels = (0..cfg.fall.count)
            .map(|i| FallingText::spawn(i, &cfg, rng))
            .collect();
        Self { cfg, labels }
    }

    /// Returns the number of labels recycled this step.
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, frames: f32, time: f32, rng: &mut R) -> usize {
        let cfg = &self.cfg;
        self.labels
            .iter_mut()
            .map(|label| label.update(dt, frames, time, cfg, rng))
            .filter(|&motion| motion == Motion::Respawned)
            .count()
    }

    pub fn message(&self, label: &FallingText) -> &str {
        self.cfg
            .messages
            .get(label.message)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FallingHeart {
    pub faller: Faller,
    pub scale: f32,
    pub spin: Spin,
    /// Z tilt, radians.
    pub wobble: f32,
    pub pulse: f32,
}

impl FallingHeart {
    fn spawn<R: Rng + ?Sized>(index: usize, cfg: &HeartRainConfig, rng: &mut R) -> Self {
        Self {
            faller: Faller::spawn(index, &cfg.fall, rng),
            scale: cfg.scale.sample(rng),
            spin: Spin::new(cfg.spin_speed.sample(rng)),
            wobble: 0.0,
            pulse: 1.0,
        }
    }

    fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        frames: f32,
        time: f32,
        cfg: &HeartRainConfig,
        rng: &mut R,
    ) -> Motion {
        let motion = self.faller.update(dt, frames, &cfg.fall, rng);
        if motion == Motion::Moved {
            let t = self.faller.elapsed;
            self.spin.step(dt);
            self.wobble = (t * 2.0).sin() * 0.15;
            self.faller.position.z =
                self.faller.base_z + (t * 0.8).cos() * self.faller.sway.amount * 0.5;
        }
        self.pulse = (time * cfg.pulse_speed).sin() * cfg.pulse_amount + 1.0;
        motion
    }

    pub fn display_scale(&self) -> f32 {
        self.scale * self.pulse
    }
}

/// All falling hearts of one scene.
#[derive(Debug, Clone)]
pub struct HeartRain {
    pub cfg: HeartRainConfig,
    pub hearts: Vec<FallingHeart>,
}

impl HeartRain {
    pub fn new<R: Rng + ?Sized>(cfg: HeartRainConfig, rng: &mut R) -> Self {
        let hearts = (0..cfg.fall.count)
            .map(|i| FallingHeart::spawn(i, &cfg, rng))
            .collect();
        Self { cfg, hearts }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, frames: f32, time: f32, rng: &mut R) -> usize {
        let cfg = &self.cfg;
        self.hearts
            .iter_mut()
            .map(|heart| heart.update(dt, frames, time, cfg, rng))
            .filter(|&motion| motion == Motion::Respawned)
            .count()
    }
}
