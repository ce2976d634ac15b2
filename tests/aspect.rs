use glam::{Vec2, Vec3};
use heartfield_wasm::camera::{OrbitCamera, Viewport};
use heartfield_wasm::config::CameraConfig;

fn approx_eq2(a: (f32, f32), b: (f32, f32), eps: f32) -> bool {
    (a.0 - b.0).abs() < eps && (a.1 - b.1).abs() < eps
}

/// Screen offset from the centre, in units of viewport height.
fn offset(cam: &OrbitCamera, vp: &Viewport, p: Vec3) -> (f32, f32) {
    let projected = cam.project(vp, p).unwrap();
    let d = (projected.screen - vp.center()) / vp.height;
    (d.x, d.y)
}

#[test]
fn aspect_invariant_vertical_fov() {
    // Two different aspect ratios
    let wide = Viewport::new(1920.0, 1080.0, 1.0);
    let tall = Viewport::new(1080.0, 1920.0, 1.0);
    let mut cam = OrbitCamera::new(CameraConfig::default(), 200.0);
    cam.press(1, Vec2::ZERO);
    cam.pointer_moved(1, Vec2::new(40.0, -25.0));
    cam.update(1_000.0);

    let samples = [
        Vec3::ZERO,
        Vec3::new(3.0, 0.0, 0.0),
        Vec3::new(0.0, 3.0, 0.0),
        Vec3::new(-2.0, 4.0, 1.5),
        Vec3::new(4.0, -2.0, -3.0),
    ];
    for p in samples {
        let a = offset(&cam, &wide, p);
        let b = offset(&cam, &tall, p);
        assert!(approx_eq2(a, b, 1e-4), "a={a:?} b={b:?}");
    }
}

#[test]
fn pixel_ratio_scales_uniformly() {
    let cam = OrbitCamera::new(CameraConfig::default(), 200.0);
    let p = Vec3::new(2.0, 1.0, -1.0);
    let one = cam.project(&Viewport::new(800.0, 600.0, 1.0), p).unwrap();
    let two = cam.project(&Viewport::new(800.0, 600.0, 2.0), p).unwrap();
    assert!((two.screen - one.screen * 2.0).length() < 1e-2);
    assert!((two.scale - one.scale * 2.0).abs() < 1e-3);
    assert!((two.depth - one.depth).abs() < 1e-4);
}
