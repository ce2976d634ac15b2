//! Orbit camera and screen projection.

use glam::{Mat4, Vec2, Vec3};

use crate::config::CameraConfig;

const NEAR: f32 = 0.1;
/// Keeps the orbit off the poles so `look_at` stays well defined.
const MAX_PITCH: f32 = 1.45;

/// Output surface size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Device pixels per CSS pixel.
    pub pixel_ratio: f32,
}

impl Viewport {
    /// Sizes below one pixel are clamped so aspect math never divides by zero.
    pub fn new(css_width: f32, css_height: f32, pixel_ratio: f32) -> Self {
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio
        } else {
            1.0
        };
        Self {
            width: (css_width * pixel_ratio).max(1.0),
            height: (css_height * pixel_ratio).max(1.0),
            pixel_ratio,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// A projected point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// Device pixels, origin top-left.
    pub screen: Vec2,
    /// Distance along the view axis; larger is farther.
    pub depth: f32,
    /// Device pixels per world unit at this depth.
    pub scale: f32,
}

#[derive(Debug, Clone)]
pub struct OrbitCamera {
    cfg: CameraConfig,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    target_yaw: f32,
    target_pitch: f32,
    target_distance: f32,
    far: f32,
    /// Pointer id and last position of the drag in progress.
    grab: Option<(i32, Vec2)>,
}

impl OrbitCamera {
    pub fn new(cfg: CameraConfig, far: f32) -> Self {
        let distance = cfg.distance.clamp(cfg.min_distance, cfg.max_distance);
        Self {
            cfg,
            yaw: 0.0,
            pitch: 0.0,
            distance,
            target_yaw: 0.0,
            target_pitch: 0.0,
            target_distance: distance,
            far: far.max(NEAR * 2.0),
            grab: None,
        }
    }

    /// Pointer `id` went down at `at` (CSS pixels). Only one pointer drags
    /// at a time; returns `false` when another one already does.
    pub fn press(&mut self, id: i32, at: Vec2) -> bool {
        if self.grab.is_some() {
            return false;
        }
        self.grab = Some((id, at));
        true
    }

    /// Pointer `id` moved to `at`. Turns the camera only for the pointer
    /// that started the drag.
    pub fn pointer_moved(&mut self, id: i32, at: Vec2) {
        let Some((grabbed, last)) = self.grab else {
            return;
        };
        if grabbed != id {
            return;
        }
        let delta = at - last;
        self.turn(delta.x, delta.y);
        self.grab = Some((id, at));
    }

    /// Pointer `id` went up or was cancelled. Returns `true` when that ended
    /// the drag.
    pub fn release(&mut self, id: i32) -> bool {
        match self.grab {
            Some((grabbed, _)) if grabbed == id => {
                self.grab = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.grab.is_some()
    }

    fn turn(&mut self, dx: f32, dy: f32) {
        self.target_yaw -= dx * self.cfg.rotate_speed;
        self.target_pitch =
            (self.target_pitch + dy * self.cfg.rotate_speed).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Wheel delta; positive moves away.
    pub fn zoom(&mut self, delta: f32) {
        self.target_distance = (self.target_distance + delta * self.cfg.zoom_speed)
            .clamp(self.cfg.min_distance, self.cfg.max_distance);
    }

    /// Ease toward the drag/zoom targets.
    pub fn update(&mut self, frames: f32) {
        let damping = self.cfg.damping;
        let k = if damping <= 0.0 || damping >= 1.0 {
            1.0
        } else {
            1.0 - (1.0 - damping).powf(frames.max(0.0))
        };
        self.yaw += (self.target_yaw - self.yaw) * k;
        self.pitch += (self.target_pitch - self.pitch) * k;
        self.distance += (self.target_distance - self.distance) * k;
    }

    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(cp * sy, sp, cp * cy) * self.distance
    }

    fn fov(&self) -> f32 {
        self.cfg.fov_degrees.clamp(1.0, 170.0).to_radians()
    }

    pub fn view_projection(&self, viewport: &Viewport) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov(), viewport.aspect(), NEAR, self.far);
        let view = Mat4::look_at_rh(self.eye(), Vec3::ZERO, Vec3::Y);
        proj * view
    }

    /// Project with a precomputed matrix; `None` when behind the camera or
    /// past the far plane.
    pub fn project_with(&self, view_proj: &Mat4, viewport: &Viewport, point: Vec3) -> Option<Projected> {
        let clip = *view_proj * point.extend(1.0);
        if clip.w <= NEAR {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if ndc.z > 1.0 {
            return None;
        }
        let screen = Vec2::new(
            (ndc.x * 0.5 + 0.5) * viewport.width,
            (0.5 - ndc.y * 0.5) * viewport.height,
        );
        let scale = viewport.height / (2.0 * (self.fov() * 0.5).tan() * clip.w);
        Some(Projected {
            screen,
            depth: clip.w,
            scale,
        })
    }

    pub fn project(&self, viewport: &Viewport, point: Vec3) -> Option<Projected> {
        self.project_with(&self.view_projection(viewport), viewport, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(CameraConfig::default(), 200.0)
    }

    #[test]
    fn origin_projects_to_center() {
        let cam = camera();
        let vp = Viewport::new(800.0, 600.0, 2.0);
        let p = cam.project(&vp, Vec3::ZERO).unwrap();
        assert!((p.screen - vp.center()).length() < 1e-3);
        assert!((p.depth - 35.0).abs() < 1e-3);
    }

    #[test]
    fn behind_camera_is_culled() {
        let cam = camera();
        let vp = Viewport::new(800.0, 600.0, 1.0);
        assert!(cam.project(&vp, Vec3::new(0.0, 0.0, 40.0)).is_none());
    }

    #[test]
    fn up_is_up_on_screen() {
        let cam = camera();
        let vp = Viewport::new(800.0, 600.0, 1.0);
        let p = cam.project(&vp, Vec3::new(0.0, 5.0, 0.0)).unwrap();
        assert!(p.screen.y < vp.center().y);
        let right = cam.project(&vp, Vec3::new(5.0, 0.0, 0.0)).unwrap();
        assert!(right.screen.x > vp.center().x);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = camera();
        cam.zoom(1e6);
        cam.update(1000.0);
        assert!((cam.distance - 50.0).abs() < 1e-3);
        cam.zoom(-1e7);
        cam.update(1000.0);
        assert!((cam.distance - 15.0).abs() < 1e-3);
    }

    #[test]
    fn drag_only_while_pressed_and_pitch_clamped() {
        let mut cam = camera();
        cam.pointer_moved(1, Vec2::new(100.0, 0.0));
        cam.update(1000.0);
        assert_eq!(cam.yaw, 0.0);
        assert!(cam.press(1, Vec2::ZERO));
        cam.pointer_moved(1, Vec2::new(0.0, 1e6));
        cam.update(1000.0);
        assert!(cam.pitch <= MAX_PITCH + 1e-4);
        assert!(cam.release(1));
        assert!(!cam.is_dragging());
    }

    #[test]
    fn second_touch_does_not_steal_the_drag() {
        let mut cam = camera();
        assert!(cam.press(7, Vec2::new(10.0, 10.0)));
        assert!(!cam.press(8, Vec2::new(300.0, 300.0)));
        // Moves of the other finger are ignored.
        cam.pointer_moved(8, Vec2::new(500.0, 300.0));
        cam.update(1000.0);
        assert_eq!(cam.yaw, 0.0);
        assert!(!cam.release(8));
        assert!(cam.is_dragging());

        cam.pointer_moved(7, Vec2::new(-90.0, 10.0));
        cam.update(1000.0);
        let expected = 100.0 * CameraConfig::default().rotate_speed;
        assert!((cam.yaw - expected).abs() < 1e-4);
        // A cancel ends it like a release would.
        assert!(cam.release(7));
        assert!(cam.press(8, Vec2::ZERO));
    }

    #[test]
    fn damping_eases_toward_target() {
        let mut cam = camera();
        cam.press(1, Vec2::ZERO);
        cam.pointer_moved(1, Vec2::new(-100.0, 0.0));
        cam.update(1.0);
        let target = 100.0 * CameraConfig::default().rotate_speed;
        assert!(cam.yaw > 0.0 && cam.yaw < target);
    }

    #[test]
    fn degenerate_viewport_is_clamped() {
        let vp = Viewport::new(0.0, 0.0, f32::NAN);
        assert_eq!(vp.width, 1.0);
        assert_eq!(vp.pixel_ratio, 1.0);
    }
}
