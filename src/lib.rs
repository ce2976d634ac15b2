#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Animated greeting field: falling captions, particle hearts, sparkles and
//! stars drawn into a browser canvas.
//!
//! The simulation modules are target independent; the browser bindings live
//! in `wasm` and only build for `wasm32`.

pub mod assets;
pub mod audio;
pub mod camera;
pub mod clock;
pub mod color;
pub mod config;
pub mod curve;
pub mod error;
pub mod falling;
pub mod field;
pub mod lifecycle;
pub mod logging;
pub mod orbit;
pub mod particle;
pub mod render;
pub mod rotation;
pub mod sparkle;

pub use config::{FieldConfig, Preset};
pub use error::{FieldError, Result};
pub use field::Field;

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;

    mod app;
    mod assets;
    mod audio;
    mod listener;
    mod render;

    pub use app::{mount, App};

    thread_local! {
        static AUTO_MOUNTED: RefCell<Option<App>> = const { RefCell::new(None) };
    }

    /// Mounts canvas `c` on load when it carries `data-autostart`; otherwise
    /// the page calls `mount` itself.
    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        crate::logging::init("info");
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let Some(canvas) = document.get_element_by_id("c") else {
            return Ok(());
        };
        if !canvas.has_attribute("data-autostart") {
            return Ok(());
        }
        let canvas = canvas.dyn_into::<web_sys::HtmlCanvasElement>()?;
        let app = App::mount_canvas(canvas, None)?;
        AUTO_MOUNTED.with(|slot| *slot.borrow_mut() = Some(app));
        Ok(())
    }
}

// When compiling for non-wasm targets (e.g., `cargo test` on host),
// provide an empty stub so the crate still builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn main() {}
