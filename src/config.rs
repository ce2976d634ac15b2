//! Field configuration and the built-in presets.
//!
//! Every layer of the scene is an optional section; a section set to `null`
//! (or absent from a preset) is simply not generated. Speeds marked "per
//! frame" are in units per nominal 60 Hz frame and get scaled by the frame
//! clock; everything else is per second.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{FieldError, Result};

/// Inclusive numeric range sampled uniformly. Written as `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub const fn fixed(value: f32) -> Self {
        Self::new(value, value)
    }

    pub fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        if hi - lo <= f32::EPSILON {
            lo
        } else {
            rng.gen_range(lo..=hi)
        }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min.min(self.max) && value <= self.max.max(self.min)
    }

    /// Both ends finite and the span representable, so sampling cannot
    /// overflow.
    fn check(&self, name: &str) -> Result<()> {
        if self.min.is_finite() && self.max.is_finite() && (self.max - self.min).is_finite() {
            Ok(())
        } else {
            Err(FieldError::Invalid(format!("{name} must be a finite range")))
        }
    }
}

fn check_finite(name: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FieldError::Invalid(format!("{name} must be finite")))
    }
}

/// A half-size sampled over `[-half, half]`.
fn check_half_extent(name: &str, half: f32) -> Result<()> {
    if (half * 2.0).is_finite() {
        Ok(())
    } else {
        Err(FieldError::Invalid(format!("{name} is too large")))
    }
}

impl From<[f32; 2]> for Interval {
    fn from([min, max]: [f32; 2]) -> Self {
        Self { min, max }
    }
}

impl From<Interval> for [f32; 2] {
    fn from(i: Interval) -> Self {
        [i.min, i.max]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Falling captions and hearts over sparkles.
    LoveLetters,
    /// Falling hearts over a star field.
    HeartRain,
    /// Captions orbiting on a sphere in front of stars.
    TextSphere,
    /// A rotating cloud of glowing points in a heart outline.
    HeartCloud,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::LoveLetters,
        Preset::HeartRain,
        Preset::TextSphere,
        Preset::HeartCloud,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::LoveLetters => "love-letters",
            Preset::HeartRain => "heart-rain",
            Preset::TextSphere => "text-sphere",
            Preset::HeartCloud => "heart-cloud",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| FieldError::UnknownPreset(name.to_string()))
    }
}

/// How the heart cloud seeds its particles. Written as an object with a
/// `kind` tag, e.g. `{"kind": "outline", "points": 120, "per_point": 6}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CloudLayout {
    /// `count` random points from the curve sampler.
    Sampled,
    /// `per_point` particles around each of `points` evenly spaced points on
    /// the outline.
    Outline { points: usize, per_point: usize },
    /// `count` points uniform in a cube of half-size `half_extent`.
    Scatter { half_extent: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartCloudConfig {
    pub layout: CloudLayout,
    /// Target particle count for `sampled` and `scatter` layouts.
    pub count: usize,
    /// Particles added per frame until `count` is reached; 0 generates the
    /// whole sampled batch up front.
    pub spawn_per_frame: usize,
    pub bias: f32,
    pub jitter: f32,
    pub scale: f32,
    pub depth: f32,
    pub size: Interval,
    /// Drift speed, per frame.
    pub speed: Interval,
    /// Life lost per frame.
    pub decay: Interval,
    /// Group rotation about Y, radians per second.
    pub spin_speed: f32,
    pub color: Color,
    pub glow: bool,
}

impl HeartCloudConfig {
    fn validate(&self) -> Result<()> {
        if self.bias <= 0.0 || !self.bias.is_finite() {
            return Err(FieldError::Invalid("heart_cloud: bias must be positive".into()));
        }
        check_finite("heart_cloud.jitter", self.jitter)?;
        check_finite("heart_cloud.scale", self.scale)?;
        check_finite("heart_cloud.depth", self.depth)?;
        check_finite("heart_cloud.spin_speed", self.spin_speed)?;
        self.size.check("heart_cloud.size")?;
        self.speed.check("heart_cloud.speed")?;
        self.decay.check("heart_cloud.decay")?;
        match self.layout {
            CloudLayout::Sampled => Ok(()),
            CloudLayout::Outline { points, per_point } => match points.checked_mul(per_point) {
                Some(_) => Ok(()),
                None => Err(FieldError::Invalid("heart_cloud: outline is too dense".into())),
            },
            CloudLayout::Scatter { half_extent } => {
                check_half_extent("heart_cloud.half_extent", half_extent)
            }
        }
    }
}

impl Default for HeartCloudConfig {
    fn default() -> Self {
        Self {
            layout: CloudLayout::Sampled,
            count: 2000,
            spawn_per_frame: 250,
            bias: 0.5,
            jitter: 0.4,
            scale: 0.35,
            depth: 2.5,
            size: Interval::new(0.05, 0.12),
            speed: Interval::new(0.002, 0.01),
            decay: Interval::new(0.004, 0.012),
            spin_speed: 0.2,
            color: Color::rgb(0, 255, 255),
            glow: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallConfig {
    pub count: usize,
    /// Half-width of the x/z spawn square.
    pub spread: f32,
    /// Entities below this height are recycled.
    pub floor: f32,
    /// Top of the visible region; respawns always land above it.
    pub ceiling: f32,
    /// Respawn height range; must lie above `ceiling`.
    pub spawn_height: Interval,
    /// Per frame.
    pub fall_speed: Interval,
    /// Seconds between consecutive entities starting to fall.
    pub stagger: f32,
    /// Delay drawn after each respawn, seconds.
    pub respawn_delay: Interval,
    /// Radians per second.
    pub sway_speed: Interval,
    pub sway_amount: Interval,
}

impl FallConfig {
    fn validate(&self, section: &str) -> Result<()> {
        check_half_extent(&format!("{section}.spread"), self.spread)?;
        check_finite(&format!("{section}.floor"), self.floor)?;
        check_finite(&format!("{section}.ceiling"), self.ceiling)?;
        check_finite(&format!("{section}.stagger"), self.stagger)?;
        for (name, range) in [
            ("spawn_height", &self.spawn_height),
            ("fall_speed", &self.fall_speed),
            ("respawn_delay", &self.respawn_delay),
            ("sway_speed", &self.sway_speed),
            ("sway_amount", &self.sway_amount),
        ] {
            range.check(&format!("{section}.{name}"))?;
        }
        // Anything not falling would never reach the floor and get recycled.
        if self.fall_speed.min.min(self.fall_speed.max) <= 0.0 {
            return Err(FieldError::Invalid(format!(
                "{section}: fall_speed must be positive"
            )));
        }
        if self.spawn_height.min.min(self.spawn_height.max) <= self.ceiling {
            return Err(FieldError::Invalid(format!(
                "{section}: spawn_height must lie above ceiling"
            )));
        }
        if self.floor >= self.ceiling {
            return Err(FieldError::Invalid(format!(
                "{section}: floor must be below ceiling"
            )));
        }
        Ok(())
    }
}

impl Default for FallConfig {
    fn default() -> Self {
        Self {
            count: 40,
            spread: 8.0,
            floor: -12.0,
            ceiling: 12.0,
            spawn_height: Interval::new(15.0, 25.0),
            fall_speed: Interval::new(0.12, 0.2),
            stagger: 0.1,
            respawn_delay: Interval::new(0.0, 0.5),
            sway_speed: Interval::new(1.5, 2.5),
            sway_amount: Interval::new(0.1, 0.4),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextRainConfig {
    pub messages: Vec<String>,
    pub fall: FallConfig,
    pub size: Interval,
    /// Tilt speed per frame for each axis.
    pub rotation_speed: f32,
    /// Largest tilt in radians.
    pub max_rotation: Interval,
    pub twinkle_speed: f32,
    /// Small glyphs hung around each caption.
    pub decoration: Option<String>,
    pub decorations_per_label: usize,
    pub decoration_radius: f32,
    pub color: Color,
    pub outline: Color,
}

impl Default for TextRainConfig {
    fn default() -> Self {
        Self {
            messages: vec![
                "I love you".into(),
                "💞 Forever 💞".into(),
                "我爱你".into(),
                "Je t'aime".into(),
            ],
            fall: FallConfig::default(),
            size: Interval::new(0.75, 1.0),
            rotation_speed: 0.0004,
            max_rotation: Interval::new(0.02, 0.087),
            twinkle_speed: 3.0,
            decoration: Some("💞".into()),
            decorations_per_label: 2,
            decoration_radius: 1.6,
            color: Color::WHITE,
            outline: Color::BLACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartRainConfig {
    pub fall: FallConfig,
    pub scale: Interval,
    /// Radians per second about Y.
    pub spin_speed: Interval,
    /// Pulse frequency, radians per second.
    pub pulse_speed: f32,
    pub pulse_amount: f32,
    pub color: Color,
    pub glow: Color,
}

impl Default for HeartRainConfig {
    fn default() -> Self {
        Self {
            fall: FallConfig {
                count: 60,
                stagger: 0.15,
                fall_speed: Interval::new(0.06, 0.1),
                respawn_delay: Interval::new(0.0, 3.0),
                sway_speed: Interval::new(1.2, 1.8),
                sway_amount: Interval::new(0.2, 0.6),
                ..FallConfig::default()
            },
            scale: Interval::new(0.25, 0.45),
            spin_speed: Interval::new(2.4, 4.8),
            pulse_speed: 2.0,
            pulse_amount: 0.15,
            color: Color::rgb(255, 0, 0),
            glow: Color::rgb(255, 68, 68),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SparkleConfig {
    pub count: usize,
    pub spread: f32,
    pub size: f32,
    pub bob: f32,
    /// Radians per second.
    pub spin_speed: f32,
    pub twinkle_speed: f32,
    pub color: Color,
}

impl Default for SparkleConfig {
    fn default() -> Self {
        Self {
            count: 180,
            spread: 8.0,
            size: 0.06,
            bob: 0.4,
            spin_speed: 1.8,
            twinkle_speed: 3.0,
            color: Color::rgb(240, 240, 240),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarConfig {
    pub count: usize,
    /// Half-size of the cube stars are scattered in.
    pub extent: f32,
    pub size: f32,
    pub opacity: f32,
    /// Radians per second.
    pub spin_speed: f32,
    pub color: Color,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            count: 2000,
            extent: 50.0,
            size: 0.1,
            opacity: 0.8,
            spin_speed: 0.006,
            color: Color::WHITE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSphereConfig {
    pub messages: Vec<String>,
    pub radius: f32,
    /// Radians per second added to every label's azimuth.
    pub angular_speed: f32,
    pub size: f32,
    pub color: Color,
}

impl Default for TextSphereConfig {
    fn default() -> Self {
        Self {
            messages: vec!["my love".into(), "i love you".into(), "forever".into()],
            radius: 20.0,
            angular_speed: 0.1,
            size: 2.0,
            color: Color::WHITE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub fov_degrees: f32,
    /// Fraction of the remaining motion applied per frame.
    pub damping: f32,
    /// Radians per dragged pixel.
    pub rotate_speed: f32,
    /// Distance change per wheel delta unit.
    pub zoom_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 35.0,
            min_distance: 15.0,
            max_distance: 50.0,
            fov_degrees: 45.0,
            damping: 0.15,
            rotate_speed: 0.005,
            zoom_speed: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub font_family: String,
    /// `url(...)` source for the font; `None` uses whatever the page has.
    pub font_url: Option<String>,
    pub logo_url: Option<String>,
    pub music_url: Option<String>,
    pub music_volume: f64,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            font_family: "serif".into(),
            font_url: None,
            logo_url: None,
            music_url: None,
            music_volume: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Fixed seed for reproducible layouts; random when absent.
    pub seed: Option<u64>,
    pub log_level: String,
    pub background: Color,
    pub heart_cloud: Option<HeartCloudConfig>,
    pub text_rain: Option<TextRainConfig>,
    pub heart_rain: Option<HeartRainConfig>,
    pub sparkles: Option<SparkleConfig>,
    pub stars: Option<StarConfig>,
    pub text_sphere: Option<TextSphereConfig>,
    pub camera: CameraConfig,
    pub assets: AssetConfig,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::preset(Preset::LoveLetters)
    }
}

impl FieldConfig {
    fn empty() -> Self {
        Self {
            seed: None,
            log_level: "info".into(),
            background: Color::BLACK,
            heart_cloud: None,
            text_rain: None,
            heart_rain: None,
            sparkles: None,
            stars: None,
            text_sphere: None,
            camera: CameraConfig::default(),
            assets: AssetConfig::default(),
        }
    }

    pub fn preset(preset: Preset) -> Self {
        let base = Self::empty();
        match preset {
            Preset::LoveLetters => Self {
                text_rain: Some(TextRainConfig::default()),
                heart_rain: Some(HeartRainConfig::default()),
                sparkles: Some(SparkleConfig::default()),
                ..base
            },
            Preset::HeartRain => Self {
                heart_rain: Some(HeartRainConfig::default()),
                sparkles: Some(SparkleConfig {
                    color: Color::rgb(255, 105, 180),
                    size: 0.1,
                    ..SparkleConfig::default()
                }),
                stars: Some(StarConfig::default()),
                ..base
            },
            Preset::TextSphere => Self {
                text_sphere: Some(TextSphereConfig::default()),
                stars: Some(StarConfig::default()),
                camera: CameraConfig {
                    distance: 50.0,
                    max_distance: 80.0,
                    fov_degrees: 75.0,
                    ..CameraConfig::default()
                },
                ..base
            },
            Preset::HeartCloud => Self {
                heart_cloud: Some(HeartCloudConfig::default()),
                camera: CameraConfig {
                    distance: 18.0,
                    min_distance: 8.0,
                    fov_degrees: 75.0,
                    ..CameraConfig::default()
                },
                ..base
            },
        }
    }

    /// Parse a JSON document. A top-level `"preset"` key picks the base the
    /// remaining keys are merged over; without it the base is `love-letters`.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        let preset = match value.as_object_mut().and_then(|o| o.remove("preset")) {
            Some(serde_json::Value::String(name)) => Preset::from_name(&name)?,
            Some(other) => {
                return Err(FieldError::Invalid(format!(
                    "preset must be a string, got {other}"
                )))
            }
            None => Preset::LoveLetters,
        };
        let mut merged = serde_json::to_value(Self::preset(preset))?;
        merge(&mut merged, value);
        let config: Self = serde_json::from_value(merged)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(text) = &self.text_rain {
            text.fall.validate("text_rain")?;
            if text.messages.is_empty() {
                return Err(FieldError::Invalid("text_rain: no messages".into()));
            }
            text.size.check("text_rain.size")?;
            text.max_rotation.check("text_rain.max_rotation")?;
            check_finite("text_rain.decoration_radius", text.decoration_radius)?;
        }
        if let Some(hearts) = &self.heart_rain {
            hearts.fall.validate("heart_rain")?;
            hearts.scale.check("heart_rain.scale")?;
            hearts.spin_speed.check("heart_rain.spin_speed")?;
        }
        if let Some(cloud) = &self.heart_cloud {
            cloud.validate()?;
        }
        if let Some(sparkles) = &self.sparkles {
            check_half_extent("sparkles.spread", sparkles.spread)?;
        }
        if let Some(stars) = &self.stars {
            check_half_extent("stars.extent", stars.extent)?;
        }
        let cam = &self.camera;
        if cam.min_distance <= 0.0 || cam.min_distance > cam.max_distance {
            return Err(FieldError::Invalid(
                "camera: need 0 < min_distance <= max_distance".into(),
            ));
        }
        Ok(())
    }
}

/// Recursive object merge; non-object values in `patch` replace `base`.
fn merge(base: &mut serde_json::Value, patch: serde_json::Value) {
    match (base, patch) {
        (serde_json::Value::Object(base), serde_json::Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) if slot.is_object() && value.is_object() => merge(slot, value),
                    _ => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, patch) => *base = patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_love_letters() {
        let cfg = FieldConfig::default();
        assert!(cfg.text_rain.is_some());
        assert!(cfg.heart_rain.is_some());
        assert!(cfg.heart_cloud.is_none());
        cfg.validate().unwrap();
    }

    #[test]
    fn every_preset_validates() {
        for preset in Preset::ALL {
            FieldConfig::preset(preset).validate().unwrap();
            assert_eq!(Preset::from_name(preset.name()).unwrap(), preset);
        }
    }

    #[test]
    fn json_merges_over_preset() {
        let cfg = FieldConfig::from_json(
            r##"{"preset": "heart-cloud", "seed": 7, "heart_cloud": {"count": 12, "color": "#ff0000"}}"##,
        )
        .unwrap();
        assert_eq!(cfg.seed, Some(7));
        let cloud = cfg.heart_cloud.unwrap();
        assert_eq!(cloud.count, 12);
        assert_eq!(cloud.color, Color::rgb(255, 0, 0));
        // Untouched keys keep the preset value.
        assert_eq!(cloud.bias, HeartCloudConfig::default().bias);
    }

    #[test]
    fn null_section_disables_layer() {
        let cfg = FieldConfig::from_json(r#"{"sparkles": null}"#).unwrap();
        assert!(cfg.sparkles.is_none());
        assert!(cfg.text_rain.is_some());
    }

    #[test]
    fn rejects_spawn_below_ceiling() {
        let err = FieldConfig::from_json(
            r#"{"text_rain": {"fall": {"ceiling": 30.0}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FieldError::Invalid(_)));
    }

    #[test]
    fn rejects_non_positive_fall_speed() {
        for speed in ["[-0.2, -0.1]", "[0.0, 0.1]"] {
            let json = format!(r#"{{"text_rain": {{"fall": {{"fall_speed": {speed}}}}}}}"#);
            let err = FieldConfig::from_json(&json).unwrap_err();
            assert!(
                matches!(&err, FieldError::Invalid(msg) if msg.contains("fall_speed")),
                "{speed}: {err}"
            );
        }
        let err = FieldConfig::from_json(r#"{"heart_rain": {"fall": {"fall_speed": [-1.0, 0.5]}}}"#)
            .unwrap_err();
        assert!(matches!(err, FieldError::Invalid(_)));
    }

    #[test]
    fn rejects_ranges_that_overflow() {
        for json in [
            r#"{"text_rain": {"fall": {"sway_amount": [-3e38, 3e38]}}}"#,
            r#"{"text_rain": {"fall": {"spread": 3e38}}}"#,
            r#"{"heart_rain": {"scale": [-3e38, 3e38]}}"#,
            r#"{"sparkles": {"spread": 3e38}}"#,
            r#"{"preset": "heart-rain", "stars": {"extent": 3e38}}"#,
            r#"{"preset": "heart-cloud", "heart_cloud": {"size": [-3e38, 3e38]}}"#,
            r#"{"preset": "heart-cloud", "heart_cloud": {"layout": {"kind": "scatter", "half_extent": 3e38}}}"#,
        ] {
            let err = FieldConfig::from_json(json).unwrap_err();
            assert!(matches!(err, FieldError::Invalid(_)), "{json}: {err}");
        }
    }

    #[test]
    fn cloud_layout_merges_over_preset() {
        let cfg = FieldConfig::from_json(
            r#"{"preset": "heart-cloud", "heart_cloud": {"layout": {"kind": "outline", "points": 60, "per_point": 5}}}"#,
        )
        .unwrap();
        let cloud = cfg.heart_cloud.unwrap();
        assert_eq!(cloud.layout, CloudLayout::Outline { points: 60, per_point: 5 });
        assert_eq!(cloud.count, HeartCloudConfig::default().count);
    }

    #[test]
    fn rejects_unknown_preset() {
        let err = FieldConfig::from_json(r#"{"preset": "confetti"}"#).unwrap_err();
        assert!(matches!(err, FieldError::UnknownPreset(name) if name == "confetti"));
    }

    #[test]
    fn interval_sampling_and_reversed_bounds() {
        use rand::SeedableRng;
        let mut rng = rand::rngs::SmallRng::seed_from_u64(1);
        let i = Interval::new(3.0, 1.0);
        for _ in 0..100 {
            let v = i.sample(&mut rng);
            assert!((1.0..=3.0).contains(&v));
            assert!(i.contains(v));
        }
        assert_eq!(Interval::fixed(2.0).sample(&mut rng), 2.0);
    }
}
