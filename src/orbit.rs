//! Captions laid out on a sphere that slowly turns about its axis.

use glam::Vec3;

use crate::config::TextSphereConfig;
use crate::curve::sphere_point;

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitLabel {
    pub message: usize,
    pub position: Vec3,
}

#[derive(Debug, Clone)]
pub struct TextSphere {
    pub cfg: TextSphereConfig,
    pub labels: Vec<OrbitLabel>,
    /// Azimuth added to every label, radians.
    pub theta: f32,
}

impl TextSphere {
    pub fn new(cfg: TextSphereConfig) -> Self {
        let count = cfg.messages.len();
        let labels = (0..count)
            .map(|i| OrbitLabel {
                message: i,
                position: sphere_point(i, count, cfg.radius, 0.0),
            })
            .collect();
        Self {
            cfg,
            labels,
            theta: 0.0,
        }
    }

    /// Place every label for absolute scene time `time`.
    pub fn update(&mut self, time: f32) {
        self.theta = time * self.cfg.angular_speed;
        let count = self.labels.len();
        for (i, label) in self.labels.iter_mut().enumerate() {
            label.position = sphere_point(i, count, self.cfg.radius, self.theta);
        }
    }

    pub fn message(&self, label: &OrbitLabel) -> &str {
        &self.cfg.messages[label.message]
    }
}
