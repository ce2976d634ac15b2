use std::f64::consts::TAU;

use glam::Vec2;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::camera::Viewport;
use crate::color::Color;
use crate::error::{FieldError, Result};
use crate::render::{Glow, HeartShape, Surface, TextStyle};

/// Heart outline spans x in [-0.6, 1.6] and y in [0, 1.9], notch at the top.
const HEART_HEIGHT: f64 = 1.9;
const HEART_CENTER: (f64, f64) = (0.5, 0.95);

/// `Surface` backed by a 2D canvas context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    logo: Option<HtmlImageElement>,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| FieldError::Js("2d canvas context unavailable".into()))?
            .dyn_into()
            .map_err(JsValue::from)?;
        Ok(Self {
            canvas,
            ctx,
            logo: None,
        })
    }

    pub fn set_logo(&mut self, image: HtmlImageElement) {
        self.logo = Some(image);
    }

    /// Size the backing store in device pixels and the element in CSS pixels.
    pub fn resize(&self, viewport: &Viewport) -> Result<()> {
        self.canvas.set_width(viewport.width as u32);
        self.canvas.set_height(viewport.height as u32);
        let style = self.canvas.style();
        style.set_property("width", &format!("{}px", viewport.width / viewport.pixel_ratio))?;
        style.set_property("height", &format!("{}px", viewport.height / viewport.pixel_ratio))?;
        Ok(())
    }

    fn heart_path(&self) {
        // Two mirrored lobes meeting in a point at the bottom.
        let ctx = &self.ctx;
        ctx.begin_path();
        ctx.move_to(0.5, 0.5);
        ctx.bezier_curve_to(0.5, 0.5, 0.4, 0.0, 0.0, 0.0);
        ctx.bezier_curve_to(-0.6, 0.0, -0.6, 0.7, -0.6, 0.7);
        ctx.bezier_curve_to(-0.6, 1.1, -0.3, 1.54, 0.5, 1.9);
        ctx.bezier_curve_to(1.2, 1.54, 1.6, 1.1, 1.6, 0.7);
        ctx.bezier_curve_to(1.6, 0.7, 1.6, 0.0, 1.0, 0.0);
        ctx.bezier_curve_to(0.7, 0.0, 0.5, 0.5, 0.5, 0.5);
        ctx.close_path();
    }
}

impl Surface for CanvasSurface {
    fn clear(&mut self, color: Color) {
        self.ctx.set_global_alpha(1.0);
        self.ctx.set_fill_style_str(&color.css(1.0));
        self.ctx.fill_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color, opacity: f32, glow: Option<Glow>) {
        let ctx = &self.ctx;
        let (x, y) = (center.x as f64, center.y as f64);
        ctx.set_global_alpha(1.0);
        ctx.begin_path();
        let gradient = glow.and_then(|glow| {
            let outer = (radius * glow.radius.max(1.0)) as f64;
            let gradient = ctx.create_radial_gradient(x, y, 0.0, x, y, outer).ok()?;
            let core = (radius as f64 / outer) as f32;
            gradient.add_color_stop(0.0, &color.css(opacity)).ok()?;
            gradient.add_color_stop(core.clamp(0.0, 1.0), &glow.color.css(opacity * 0.6)).ok()?;
            gradient.add_color_stop(1.0, &glow.color.css(0.0)).ok()?;
            Some((gradient, outer))
        });
        match gradient {
            Some((gradient, outer)) => {
                ctx.set_fill_style_canvas_gradient(&gradient);
                let _ = ctx.arc(x, y, outer, 0.0, TAU);
            }
            None => {
                ctx.set_fill_style_str(&color.css(opacity));
                let _ = ctx.arc(x, y, radius.max(0.0) as f64, 0.0, TAU);
            }
        }
        ctx.fill();
    }

    fn draw_text(&mut self, text: &str, at: Vec2, rotation: f32, style: &TextStyle<'_>, opacity: f32) {
        if style.size_px < 1.0 {
            return;
        }
        let ctx = &self.ctx;
        ctx.save();
        let _ = ctx.translate(at.x as f64, at.y as f64);
        let _ = ctx.rotate(rotation as f64);
        ctx.set_global_alpha(opacity.clamp(0.0, 1.0) as f64);
        ctx.set_font(&format!("{:.1}px {}", style.size_px, style.family));
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        if let Some(outline) = style.outline {
            ctx.set_line_join("round");
            ctx.set_line_width((style.size_px * 0.08).max(1.0) as f64);
            ctx.set_stroke_style_str(&outline.css(1.0));
            let _ = ctx.stroke_text(text, 0.0, 0.0);
        }
        ctx.set_fill_style_str(&style.color.css(1.0));
        let _ = ctx.fill_text(text, 0.0, 0.0);
        ctx.restore();
    }

    fn fill_heart(&mut self, heart: &HeartShape, color: Color, opacity: f32, glow: Option<Glow>) {
        if heart.size < 0.5 {
            return;
        }
        let ctx = &self.ctx;
        ctx.save();
        let unit = heart.size as f64 / HEART_HEIGHT;
        // A heart seen edge-on still shows a sliver.
        let squash = (heart.squash as f64).abs().max(0.08);
        let _ = ctx.translate(heart.center.x as f64, heart.center.y as f64);
        let _ = ctx.rotate(heart.rotation as f64);
        let _ = ctx.scale(unit * squash, unit);
        let _ = ctx.translate(-HEART_CENTER.0, -HEART_CENTER.1);
        ctx.set_global_alpha(opacity.clamp(0.0, 1.0) as f64);
        if let Some(glow) = glow {
            ctx.set_shadow_color(&glow.color.css(1.0));
            ctx.set_shadow_blur((heart.size * glow.radius * 0.25) as f64);
        }
        ctx.set_fill_style_str(&color.css(1.0));
        self.heart_path();
        ctx.fill();
        ctx.restore();
    }

    fn draw_logo(&mut self, center: Vec2, size: f32, rotation: f32) {
        let Some(logo) = &self.logo else {
            return;
        };
        let ctx = &self.ctx;
        let aspect = if logo.natural_height() > 0 {
            logo.natural_width() as f64 / logo.natural_height() as f64
        } else {
            1.0
        };
        let h = size as f64;
        let w = h * aspect;
        ctx.save();
        ctx.set_global_alpha(1.0);
        let _ = ctx.translate(center.x as f64, center.y as f64);
        let _ = ctx.rotate(rotation as f64);
        let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(logo, -w / 2.0, -h / 2.0, w, h);
        ctx.restore();
    }
}
