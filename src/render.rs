//! Draws a [`Field`] onto any 2D [`Surface`].
//!
//! Every entity is projected through the camera, culled when behind it or
//! off screen, and painted far-to-near so nearer shapes cover farther ones.

use glam::{Quat, Vec2, Vec3};

use crate::assets::Assets;
use crate::camera::{OrbitCamera, Projected, Viewport};
use crate::color::Color;
use crate::field::Field;

/// Radians per second of the corner logo.
const LOGO_SPIN: f32 = 0.6;
/// Logo size as a fraction of the shorter viewport side.
const LOGO_SIZE: f32 = 0.12;
/// Smallest radius drawn, device pixels.
const MIN_RADIUS: f32 = 0.5;

/// Soft halo around a shape: opaque at the core, fading out at
/// `radius` times the core size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: Color,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle<'a> {
    pub family: &'a str,
    pub size_px: f32,
    pub color: Color,
    pub outline: Option<Color>,
}

/// A heart outline in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartShape {
    pub center: Vec2,
    /// Height in device pixels.
    pub size: f32,
    /// In-plane rotation, radians.
    pub rotation: f32,
    /// Horizontal scale in `[-1, 1]`; `cos` of the spin about Y.
    pub squash: f32,
}

/// The drawing primitives a field needs. Coordinates are device pixels.
pub trait Surface {
    fn clear(&mut self, color: Color);

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color, opacity: f32, glow: Option<Glow>);

    fn draw_text(&mut self, text: &str, at: Vec2, rotation: f32, style: &TextStyle<'_>, opacity: f32);

    fn fill_heart(&mut self, heart: &HeartShape, color: Color, opacity: f32, glow: Option<Glow>);

    fn draw_logo(&mut self, center: Vec2, size: f32, rotation: f32);
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Item {
    Star,
    Sparkle(usize),
    Cloud(usize),
    Heart(usize),
    Label(usize),
    Decoration(usize),
    Orbit(usize),
}

#[derive(Debug, Clone, Copy)]
struct Queued {
    item: Item,
    at: Projected,
}

/// Reusable draw queue; one per canvas.
#[derive(Debug, Default)]
pub struct Renderer {
    font_family: String,
    queue: Vec<Queued>,
}

impl Renderer {
    pub fn new(font_family: impl Into<String>) -> Self {
        Self {
            font_family: font_family.into(),
            queue: Vec::new(),
        }
    }

    /// Paint one frame. Returns the number of shapes drawn.
    pub fn draw<S: Surface + ?Sized>(
        &mut self,
        field: &Field,
        camera: &OrbitCamera,
        viewport: &Viewport,
        assets: &Assets,
        surface: &mut S,
    ) -> usize {
        surface.clear(field.background);
        self.collect(field, camera, viewport, assets.text_enabled());
        self.queue
            .sort_by(|a, b| b.at.depth.total_cmp(&a.at.depth));

        let mut drawn = 0;
        for queued in &self.queue {
            self.paint(field, queued, surface);
            drawn += 1;
        }

        if assets.logo_enabled() {
            let size = viewport.width.min(viewport.height) * LOGO_SIZE;
            let center = Vec2::new(viewport.width - size, size);
            surface.draw_logo(center, size, field.time * LOGO_SPIN);
            drawn += 1;
        }
        drawn
    }

    fn collect(&mut self, field: &Field, camera: &OrbitCamera, viewport: &Viewport, text: bool) {
        self.queue.clear();
        let view_proj = camera.view_projection(viewport);
        let margin = viewport.width.max(viewport.height) * 0.1;
        let queue = &mut self.queue;
        let mut push = |item: Item, world: Vec3| {
            if let Some(at) = camera.project_with(&view_proj, viewport, world) {
                let s = at.screen;
                if s.x >= -margin
                    && s.y >= -margin
                    && s.x <= viewport.width + margin
                    && s.y <= viewport.height + margin
                {
                    queue.push(Queued { item, at });
                }
            }
        };

        if let Some(stars) = &field.stars {
            let turn = Quat::from_rotation_y(stars.spin.angle);
            for star in &stars.stars {
                push(Item::Star, turn * *star);
            }
        }
        if let Some(sparkles) = &field.sparkles {
            for (i, sparkle) in sparkles.items.iter().enumerate() {
                push(Item::Sparkle(i), sparkle.position);
            }
        }
        if let Some(cloud) = &field.heart_cloud {
            let turn = Quat::from_rotation_y(cloud.spin.angle);
            for (i, particle) in cloud.pool.iter().enumerate() {
                push(Item::Cloud(i), turn * particle.position);
            }
        }
        if let Some(rain) = &field.heart_rain {
            for (i, heart) in rain.hearts.iter().enumerate() {
                push(Item::Heart(i), heart.faller.position);
            }
        }
        if !text {
            return;
        }
        if let Some(rain) = &field.text_rain {
            for (i, label) in rain.labels.iter().enumerate() {
                push(Item::Label(i), label.faller.position);
                if rain.cfg.decoration.is_some() {
                    for decoration in &label.decorations {
                        push(Item::Decoration(i), label.faller.position + decoration.offset);
                    }
                }
            }
        }
        if let Some(sphere) = &field.text_sphere {
            for (i, label) in sphere.labels.iter().enumerate() {
                push(Item::Orbit(i), label.position);
            }
        }
    }

    fn paint<S: Surface + ?Sized>(&self, field: &Field, queued: &Queued, surface: &mut S) {
        let Queued { item, at } = *queued;
        // Queue indices were taken from this same field, so lookups hit.
        match item {
            Item::Star => {
                if let Some(stars) = &field.stars {
                    let r = (stars.cfg.size * at.scale).max(MIN_RADIUS);
                    surface.fill_circle(at.screen, r, stars.cfg.color, stars.cfg.opacity, None);
                }
            }
            Item::Sparkle(i) => {
                if let Some((sparkles, sparkle)) = field
                    .sparkles
                    .as_ref()
                    .and_then(|s| s.items.get(i).map(|item| (s, item)))
                {
                    // The spin shows as a glint in the radius.
                    let glint = 0.75 + 0.25 * sparkle.spin.angle.cos();
                    let r = (sparkles.cfg.size * at.scale * glint).max(MIN_RADIUS);
                    let glow = Glow {
                        color: sparkles.cfg.color,
                        radius: 2.5,
                    };
                    surface.fill_circle(at.screen, r, sparkles.cfg.color, sparkle.opacity, Some(glow));
                }
            }
            Item::Cloud(i) => {
                if let Some((cloud, p)) = field
                    .heart_cloud
                    .as_ref()
                    .and_then(|c| c.pool.as_slice().get(i).map(|p| (c, p)))
                {
                    let glow = cloud.cfg.glow.then_some(Glow {
                        color: p.color,
                        radius: 3.0,
                    });
                    let r = (p.size * at.scale).max(MIN_RADIUS);
                    surface.fill_circle(at.screen, r, p.color, p.opacity(), glow);
                }
            }
            Item::Heart(i) => {
                if let Some((rain, heart)) = field
                    .heart_rain
                    .as_ref()
                    .and_then(|r| r.hearts.get(i).map(|h| (r, h)))
                {
                    let shape = HeartShape {
                        center: at.screen,
                        size: heart.display_scale() * at.scale,
                        rotation: heart.wobble,
                        squash: heart.spin.angle.cos(),
                    };
                    let glow = Glow {
                        color: rain.cfg.glow,
                        radius: 1.6,
                    };
                    surface.fill_heart(&shape, rain.cfg.color, 1.0, Some(glow));
                }
            }
            Item::Label(i) => {
                if let Some((rain, label)) = field
                    .text_rain
                    .as_ref()
                    .and_then(|r| r.labels.get(i).map(|l| (r, l)))
                {
                    let style = TextStyle {
                        family: &self.font_family,
                        size_px: label.size * at.scale,
                        color: rain.cfg.color,
                        outline: Some(rain.cfg.outline),
                    };
                    surface.draw_text(
                        rain.message(label),
                        at.screen,
                        label.rotation.angle.z,
                        &style,
                        label.opacity,
                    );
                }
            }
            Item::Decoration(i) => {
                if let Some((rain, label, glyph)) = field.text_rain.as_ref().and_then(|r| {
                    let glyph = r.cfg.decoration.as_deref()?;
                    r.labels.get(i).map(|l| (r, l, glyph))
                }) {
                    let style = TextStyle {
                        family: &self.font_family,
                        size_px: label.size * 0.5 * at.scale,
                        color: rain.cfg.color,
                        outline: None,
                    };
                    surface.draw_text(glyph, at.screen, 0.0, &style, label.opacity);
                }
            }
            Item::Orbit(i) => {
                if let Some((sphere, label)) = field
                    .text_sphere
                    .as_ref()
                    .and_then(|s| s.labels.get(i).map(|l| (s, l)))
                {
                    let style = TextStyle {
                        family: &self.font_family,
                        size_px: sphere.cfg.size * at.scale,
                        color: sphere.cfg.color,
                        outline: None,
                    };
                    surface.draw_text(sphere.message(label), at.screen, 0.0, &style, 1.0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetState;
    use crate::clock::Tick;
    use crate::config::{AssetConfig, CameraConfig, FieldConfig, Preset};
    use crate::error::FieldError;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Clear,
        Circle,
        Text(String),
        Heart,
        Logo,
    }

    #[derive(Default)]
    struct RecordingSurface {
        calls: Vec<Call>,
    }

    impl Surface for RecordingSurface {
        fn clear(&mut self, _color: Color) {
            self.calls.push(Call::Clear);
        }

        fn fill_circle(&mut self, _c: Vec2, _r: f32, _col: Color, _o: f32, _g: Option<Glow>) {
            self.calls.push(Call::Circle);
        }

        fn draw_text(&mut self, text: &str, _at: Vec2, _r: f32, _s: &TextStyle<'_>, _o: f32) {
            self.calls.push(Call::Text(text.to_string()));
        }

        fn fill_heart(&mut self, _h: &HeartShape, _c: Color, _o: f32, _g: Option<Glow>) {
            self.calls.push(Call::Heart);
        }

        fn draw_logo(&mut self, _c: Vec2, _s: f32, _r: f32) {
            self.calls.push(Call::Logo);
        }
    }

    fn setup(preset: Preset) -> (Field, OrbitCamera, Viewport) {
        let field = Field::new(&FieldConfig::preset(preset), 9);
        let cam = OrbitCamera::new(FieldConfig::preset(preset).camera, field.extent() * 4.0);
        (field, cam, Viewport::new(800.0, 600.0, 1.0))
    }

    #[test]
    fn clears_first_and_counts_draws() {
        let (mut field, cam, vp) = setup(Preset::LoveLetters);
        field.text_rain.as_mut().unwrap().labels[0].faller.position = Vec3::ZERO;
        let assets = Assets::new(&AssetConfig::default());
        let mut surface = RecordingSurface::default();
        let mut renderer = Renderer::new("serif");
        let drawn = renderer.draw(&field, &cam, &vp, &assets, &mut surface);
        assert_eq!(surface.calls[0], Call::Clear);
        assert_eq!(surface.calls.len(), drawn + 1);
        assert!(surface.calls.iter().any(|c| matches!(c, Call::Text(_))));
    }

    #[test]
    fn text_skipped_without_font() {
        let (field, cam, vp) = setup(Preset::TextSphere);
        let mut assets = Assets::new(&AssetConfig {
            font_url: Some("url(font.woff2)".into()),
            ..AssetConfig::default()
        });
        Assets::settle(
            &mut assets.font,
            Err(FieldError::AssetLoad {
                asset: "serif".into(),
                reason: "offline".into(),
            }),
        );
        let mut surface = RecordingSurface::default();
        Renderer::new("serif").draw(&field, &cam, &vp, &assets, &mut surface);
        assert!(!surface.calls.iter().any(|c| matches!(c, Call::Text(_))));
        // Stars still render.
        assert!(surface.calls.iter().any(|c| *c == Call::Circle));
    }

    #[test]
    fn orbit_labels_painted_far_to_near() {
        let mut cfg = FieldConfig::preset(Preset::TextSphere);
        cfg.stars = None;
        let field = Field::new(&cfg, 1);
        let cam = OrbitCamera::new(cfg.camera.clone(), 400.0);
        let vp = Viewport::new(1000.0, 1000.0, 1.0);
        let mut surface = RecordingSurface::default();
        Renderer::new("serif").draw(&field, &cam, &vp, &Assets::new(&cfg.assets), &mut surface);

        let painted: Vec<String> = surface
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Text(t) => Some(t.clone()),
                _ => None,
            })
            .collect();
        // The camera looks down -Z, so lower z is farther away.
        let expected = vec!["forever", "i love you", "my love"];
        assert_eq!(painted, expected);
    }

    #[test]
    fn logo_drawn_once_ready() {
        let (mut field, cam, vp) = setup(Preset::HeartCloud);
        field.step(Tick::nominal());
        let mut assets = Assets::new(&AssetConfig {
            logo_url: Some("logo.png".into()),
            ..AssetConfig::default()
        });
        let mut renderer = Renderer::new("serif");

        let mut surface = RecordingSurface::default();
        renderer.draw(&field, &cam, &vp, &assets, &mut surface);
        assert!(!surface.calls.contains(&Call::Logo));

        assets.logo = AssetState::Ready;
        let mut surface = RecordingSurface::default();
        renderer.draw(&field, &cam, &vp, &assets, &mut surface);
        assert_eq!(surface.calls.last(), Some(&Call::Logo));
    }

    #[test]
    fn hearts_behind_camera_are_culled() {
        let mut cfg = FieldConfig::preset(Preset::HeartRain);
        cfg.stars = None;
        cfg.sparkles = None;
        let mut field = Field::new(&cfg, 5);
        let cam = OrbitCamera::new(
            CameraConfig {
                distance: 20.0,
                min_distance: 20.0,
                ..CameraConfig::default()
            },
            200.0,
        );
        let hearts = field.heart_rain.as_mut().unwrap();
        for heart in &mut hearts.hearts {
            heart.faller.position = Vec3::new(0.0, 0.0, 25.0);
        }
        hearts.hearts[0].faller.position = Vec3::ZERO;
        let mut surface = RecordingSurface::default();
        let drawn = Renderer::new("serif").draw(
            &field,
            &cam,
            &Viewport::new(800.0, 600.0, 1.0),
            &Assets::new(&cfg.assets),
            &mut surface,
        );
        assert_eq!(drawn, 1);
        assert_eq!(surface.calls, vec![Call::Clear, Call::Heart]);
    }
}
