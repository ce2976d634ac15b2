#![cfg(target_arch = "wasm32")]

use heartfield_wasm::wasm::{mount, App};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const QUIET: &str = r#"{"seed": 1, "assets": {"music_url": null}}"#;

fn add_canvas(id: &str) -> web_sys::HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let elem = document.create_element("canvas").unwrap();
    elem.set_id(id);
    document.body().unwrap().append_child(&elem).unwrap();
    elem.dyn_into().unwrap()
}

#[wasm_bindgen_test]
fn mount_then_unmount_twice() {
    add_canvas("mount-twice");
    let mut app = mount("mount-twice", Some(QUIET.into())).unwrap();
    assert!(app.is_mounted());
    assert!(!app.is_music_playing());
    app.unmount();
    app.unmount();
    assert!(!app.is_mounted());
    assert!(!app.toggle_music());
}

#[wasm_bindgen_test]
fn canvas_is_sized_on_mount() {
    let canvas = add_canvas("sized");
    let app = App::mount_canvas(canvas.clone(), Some(QUIET)).unwrap();
    assert!(canvas.width() > 0 && canvas.height() > 0);
    drop(app);
}

#[wasm_bindgen_test]
fn data_config_attribute_is_read() {
    let canvas = add_canvas("from-attribute");
    canvas
        .set_attribute("data-config", r#"{"preset": "text-sphere", "assets": {"music_url": null}}"#)
        .unwrap();
    let app = mount("from-attribute", None).unwrap();
    assert!(app.is_mounted());
}

#[wasm_bindgen_test]
fn mount_errors_are_reported() {
    assert!(mount("no-such-canvas", None).is_err());
    add_canvas("bad-config");
    assert!(mount("bad-config", Some(r#"{"preset": "confetti"}"#.into())).is_err());
}

#[wasm_bindgen_test]
fn default_mount_has_no_track() {
    add_canvas("no-track");
    let mut app = mount("no-track", None).unwrap();
    assert!(!app.toggle_music());
    assert!(!app.is_music_playing());
}

#[wasm_bindgen_test]
fn pointer_drag_events_are_handled() {
    let canvas = add_canvas("drag");
    let app = App::mount_canvas(canvas.clone(), Some(QUIET)).unwrap();
    for kind in ["pointerdown", "pointermove", "pointerup", "pointerdown", "pointercancel"] {
        let event = web_sys::PointerEvent::new(kind).unwrap();
        canvas.dispatch_event(&event).unwrap();
    }
    assert!(app.is_mounted());
}
