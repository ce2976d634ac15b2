use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Vec2;
use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
use web_sys::{HtmlCanvasElement, HtmlImageElement, PointerEvent, WheelEvent, Window};

use super::assets::{describe, load_font, ImageLoad, PromiseHook};
use super::audio::{self, Player, SharedPlayer};
use super::listener::EventListener;
use super::render::CanvasSurface;
use crate::assets::Assets;
use crate::camera::{OrbitCamera, Viewport};
use crate::clock::FrameClock;
use crate::config::FieldConfig;
use crate::error::{FieldError, Result};
use crate::field::Field;
use crate::lifecycle::{FrameId, FrameScheduler, Lifecycle};
use crate::logging;
use crate::render::Renderer;

type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// `requestAnimationFrame` with a single reusable callback.
struct RafScheduler {
    window: Window,
    callback: FrameSlot,
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> Result<FrameId> {
        let slot = self.callback.borrow();
        let callback = slot.as_ref().ok_or(FieldError::Detached)?;
        let id = self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())?;
        Ok(FrameId(id))
    }

    fn cancel_frame(&mut self, id: FrameId) {
        let _ = self.window.cancel_animation_frame(id.0);
    }
}

/// State owned by the frame callback.
struct Runtime {
    window: Window,
    field: Field,
    camera: OrbitCamera,
    clock: FrameClock,
    renderer: Renderer,
    assets: Assets,
    surface: CanvasSurface,
    viewport: Viewport,
    lifecycle: Lifecycle<RafScheduler>,
}

impl Runtime {
    fn frame(&mut self, now_ms: f64) {
        if !self.lifecycle.begin_frame() {
            return;
        }
        let tick = self.clock.tick(Some(now_ms));
        self.field.step(tick);
        self.camera.update(tick.frames);
        self.renderer.draw(
            &self.field,
            &self.camera,
            &self.viewport,
            &self.assets,
            &mut self.surface,
        );
        if let Err(err) = self.lifecycle.end_frame() {
            log::error!("animation stopped: {err}");
            self.lifecycle.teardown();
        }
    }

    fn resize(&mut self) -> Result<()> {
        self.viewport = measure(&self.window)?;
        self.surface.resize(&self.viewport)
    }

    /// Start the loop once the font has settled either way.
    fn start_when_ready(&mut self) {
        if !self.assets.ready_to_start() || self.lifecycle.is_running() {
            return;
        }
        match self.lifecycle.start() {
            Ok(()) => {
                // The wait for the font must not show up as one long step.
                self.clock.reset();
                log::info!("animation started, {} entities", self.field.entity_count());
            }
            Err(FieldError::Detached) => {}
            Err(err) => log::error!("could not start animation: {err}"),
        }
    }

    fn font_settled(&mut self, result: Result<()>) {
        if let Err(err) = &result {
            log::warn!("{err}; captions hidden");
        }
        Assets::settle(&mut self.assets.font, result);
        self.start_when_ready();
    }

    fn logo_settled(&mut self, result: Result<HtmlImageElement>) {
        let result = result.map(|image| self.surface.set_logo(image));
        if let Err(err) = &result {
            log::warn!("{err}; logo hidden");
        }
        Assets::settle(&mut self.assets.logo, result);
    }
}

fn with_runtime(weak: &Weak<RefCell<Runtime>>, f: impl FnOnce(&mut Runtime)) {
    if let Some(runtime) = weak.upgrade() {
        if let Ok(mut runtime) = runtime.try_borrow_mut() {
            f(&mut runtime);
        }
    }
}

fn measure(window: &Window) -> Result<Viewport> {
    let width = window.inner_width()?.as_f64().unwrap_or(0.0);
    let height = window.inner_height()?.as_f64().unwrap_or(0.0);
    Ok(Viewport::new(
        width as f32,
        height as f32,
        window.device_pixel_ratio() as f32,
    ))
}

fn client_position(event: &PointerEvent) -> Vec2 {
    Vec2::new(event.client_x() as f32, event.client_y() as f32)
}

fn random_seed() -> u64 {
    (js_sys::Math::random() * 9_007_199_254_740_992.0) as u64
}

/// A mounted animation. Dropping it (or calling `free()` from JS) unmounts.
#[wasm_bindgen]
pub struct App {
    runtime: Option<Rc<RefCell<Runtime>>>,
    frame: FrameSlot,
    listeners: Vec<EventListener>,
    player: Option<SharedPlayer>,
    font: Option<PromiseHook>,
    logo: Option<ImageLoad>,
}

impl App {
    pub fn mount_canvas(canvas: HtmlCanvasElement, config_json: Option<&str>) -> Result<App> {
        console_error_panic_hook::set_once();
        let attribute = canvas.get_attribute("data-config");
        let config = match config_json.or(attribute.as_deref()) {
            Some(json) if !json.trim().is_empty() => FieldConfig::from_json(json)?,
            _ => FieldConfig::default(),
        };
        logging::init(&config.log_level);

        let window = web_sys::window().ok_or_else(|| FieldError::MissingElement("window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| FieldError::MissingElement("document".into()))?;

        let seed = config.seed.unwrap_or_else(random_seed);
        let field = Field::new(&config, seed);
        let camera = OrbitCamera::new(config.camera.clone(), field.extent() * 4.0);
        let viewport = measure(&window)?;
        let surface = CanvasSurface::new(canvas.clone())?;
        surface.resize(&viewport)?;

        let frame: FrameSlot = Rc::new(RefCell::new(None));
        let runtime = Rc::new(RefCell::new(Runtime {
            window: window.clone(),
            field,
            camera,
            clock: FrameClock::new(),
            renderer: Renderer::new(config.assets.font_family.clone()),
            assets: Assets::new(&config.assets),
            surface,
            viewport,
            lifecycle: Lifecycle::new(RafScheduler {
                window: window.clone(),
                callback: frame.clone(),
            }),
        }));
        log::info!("mounted with seed {seed}");

        let weak = Rc::downgrade(&runtime);
        *frame.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
            with_runtime(&weak, |rt| rt.frame(now));
        }) as Box<dyn FnMut(f64)>));

        let mut app = App {
            runtime: Some(runtime.clone()),
            frame,
            listeners: Vec::new(),
            player: None,
            font: None,
            logo: None,
        };
        // On error `app` drops here and releases what was set up so far.
        app.listen(&window, &canvas, &runtime)?;

        if let Some(source) = config.assets.font_url.as_deref() {
            let weak = Rc::downgrade(&runtime);
            let hook = load_font(&document, &config.assets.font_family, source, move |result| {
                with_runtime(&weak, |rt| rt.font_settled(result));
            });
            match hook {
                Ok(hook) => app.font = Some(hook),
                Err(err) => runtime.borrow_mut().font_settled(Err(FieldError::AssetLoad {
                    asset: config.assets.font_family.clone(),
                    reason: err.to_string(),
                })),
            }
        }

        if let Some(url) = config.assets.logo_url.as_deref() {
            let weak = Rc::downgrade(&runtime);
            match ImageLoad::start(url, move |result| {
                with_runtime(&weak, |rt| rt.logo_settled(result));
            }) {
                Ok(load) => app.logo = Some(load),
                Err(err) => runtime.borrow_mut().logo_settled(Err(FieldError::AssetLoad {
                    asset: url.to_string(),
                    reason: err.to_string(),
                })),
            }
        }

        match Player::open(&config.assets) {
            Ok(Some(player)) => {
                audio::autoplay(&player);
                app.player = Some(player);
            }
            Ok(None) => {}
            Err(err) => {
                let err = FieldError::AssetLoad {
                    asset: "music".into(),
                    reason: err.to_string(),
                };
                log::warn!("{err}");
                Assets::settle(&mut runtime.borrow_mut().assets.music, Err(err));
            }
        }

        runtime.borrow_mut().start_when_ready();
        Ok(app)
    }

    fn listen(
        &mut self,
        window: &Window,
        canvas: &HtmlCanvasElement,
        runtime: &Rc<RefCell<Runtime>>,
    ) -> Result<()> {
        let weak = Rc::downgrade(runtime);
        self.listeners.push(EventListener::new(window, "resize", move |_| {
            with_runtime(&weak, |rt| {
                if let Err(err) = rt.resize() {
                    log::warn!("resize failed: {err}");
                }
            });
        })?);

        let weak = Rc::downgrade(runtime);
        let target = canvas.clone();
        self.listeners.push(EventListener::new(canvas, "pointerdown", move |event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            with_runtime(&weak, |rt| {
                let id = event.pointer_id();
                if !rt.camera.press(id, client_position(event)) {
                    return;
                }
                // Keeps the drag alive when the pointer leaves the canvas.
                if let Err(err) = target.set_pointer_capture(id) {
                    log::debug!("pointer capture refused: {}", describe(&err));
                }
            });
        })?);

        let weak = Rc::downgrade(runtime);
        self.listeners.push(EventListener::new(canvas, "pointermove", move |event| {
            let Some(event) = event.dyn_ref::<PointerEvent>() else {
                return;
            };
            with_runtime(&weak, |rt| {
                rt.camera.pointer_moved(event.pointer_id(), client_position(event));
            });
        })?);

        for name in ["pointerup", "pointercancel"] {
            let weak = Rc::downgrade(runtime);
            let target = canvas.clone();
            self.listeners.push(EventListener::new(canvas, name, move |event| {
                let Some(event) = event.dyn_ref::<PointerEvent>() else {
                    return;
                };
                let id = event.pointer_id();
                with_runtime(&weak, |rt| {
                    if rt.camera.release(id) && target.has_pointer_capture(id) {
                        let _ = target.release_pointer_capture(id);
                    }
                });
            })?);
        }

        let weak = Rc::downgrade(runtime);
        self.listeners.push(EventListener::new(canvas, "wheel", move |event| {
            let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
                return;
            };
            event.prevent_default();
            with_runtime(&weak, |rt| rt.camera.zoom(wheel.delta_y() as f32));
        })?);
        Ok(())
    }
}

#[wasm_bindgen]
impl App {
    /// Stop the animation and release listeners, callbacks and audio.
    /// Safe to call more than once.
    pub fn unmount(&mut self) {
        let Some(runtime) = self.runtime.take() else {
            return;
        };
        self.listeners.clear();
        self.font = None;
        self.logo = None;
        if let Ok(mut rt) = runtime.try_borrow_mut() {
            rt.lifecycle.teardown();
        }
        self.frame.borrow_mut().take();
        if let Some(player) = self.player.take() {
            audio::stop(&player);
        }
        log::info!("unmounted");
    }

    /// Play or pause the music. Returns `true` when playback was requested.
    pub fn toggle_music(&mut self) -> bool {
        match &self.player {
            Some(player) if self.runtime.is_some() => audio::toggle(player),
            _ => false,
        }
    }

    pub fn is_music_playing(&self) -> bool {
        self.player
            .as_ref()
            .map_or(false, |player| player.borrow().is_playing())
    }

    pub fn is_mounted(&self) -> bool {
        self.runtime.is_some()
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Mount onto the canvas with id `canvas_id`. `config_json` overrides the
/// element's `data-config` attribute.
#[wasm_bindgen]
pub fn mount(canvas_id: &str, config_json: Option<String>) -> std::result::Result<App, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| FieldError::MissingElement("document".into()))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| FieldError::MissingElement(format!("#{canvas_id}")))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| FieldError::MissingElement(format!("#{canvas_id} is not a canvas")))?;
    Ok(App::mount_canvas(canvas, config_json.as_deref())?)
}
