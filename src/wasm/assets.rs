//! Font and image loading with callbacks that outlive nothing they touch.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Promise;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, FontFace, HtmlImageElement};

use crate::error::{FieldError, Result};

type Done<T> = Rc<RefCell<Option<Box<dyn FnOnce(std::result::Result<T, String>)>>>>;

fn once<T: 'static>(done: impl FnOnce(std::result::Result<T, String>) + 'static) -> Done<T> {
    Rc::new(RefCell::new(Some(Box::new(done))))
}

fn finish<T>(done: &Done<T>, result: std::result::Result<T, String>) {
    let callback = done.borrow_mut().take();
    if let Some(callback) = callback {
        callback(result);
    }
}

pub fn describe(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Keeps the `then` callbacks of a promise alive until it settles.
///
/// Dropping the hook early leaks the two closures instead of freeing them,
/// since the promise still holds references and will call one of them.
pub struct PromiseHook {
    on_resolve: Option<Closure<dyn FnMut(JsValue)>>,
    on_reject: Option<Closure<dyn FnMut(JsValue)>>,
    settled: Rc<Cell<bool>>,
}

impl PromiseHook {
    pub fn attach<F>(promise: &Promise, done: F) -> Self
    where
        F: FnOnce(std::result::Result<JsValue, String>) + 'static,
    {
        let settled = Rc::new(Cell::new(false));
        let done = once(done);

        let on_resolve = {
            let settled = settled.clone();
            let done = done.clone();
            Closure::wrap(Box::new(move |value: JsValue| {
                settled.set(true);
                finish(&done, Ok(value));
            }) as Box<dyn FnMut(JsValue)>)
        };
        let on_reject = {
            let settled = settled.clone();
            Closure::wrap(Box::new(move |reason: JsValue| {
                settled.set(true);
                finish(&done, Err(describe(&reason)));
            }) as Box<dyn FnMut(JsValue)>)
        };
        let _ = promise.then2(&on_resolve, &on_reject);

        Self {
            on_resolve: Some(on_resolve),
            on_reject: Some(on_reject),
            settled,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.settled.get()
    }
}

impl Drop for PromiseHook {
    fn drop(&mut self) {
        if self.settled.get() {
            return;
        }
        if let Some(callback) = self.on_resolve.take() {
            callback.forget();
        }
        if let Some(callback) = self.on_reject.take() {
            callback.forget();
        }
    }
}

/// Register `family` from `source` (a CSS `url(...)` list) and load it.
pub fn load_font<F>(document: &Document, family: &str, source: &str, done: F) -> Result<PromiseHook>
where
    F: FnOnce(Result<()>) + 'static,
{
    let face = FontFace::new_with_str(family, source)?;
    document.fonts().add(&face)?;
    let promise = face.load()?;
    let asset = family.to_string();
    Ok(PromiseHook::attach(&promise, move |result| {
        done(
            result
                .map(|_| ())
                .map_err(|reason| FieldError::AssetLoad { asset, reason }),
        )
    }))
}

/// An `<img>` being fetched. Dropping it detaches the handlers.
pub struct ImageLoad {
    image: HtmlImageElement,
    _on_load: Closure<dyn FnMut()>,
    _on_error: Closure<dyn FnMut()>,
}

impl ImageLoad {
    pub fn start<F>(url: &str, done: F) -> Result<Self>
    where
        F: FnOnce(Result<HtmlImageElement>) + 'static,
    {
        let image = HtmlImageElement::new()?;
        let asset = url.to_string();
        let done = once(move |result: std::result::Result<HtmlImageElement, String>| {
            done(result.map_err(|reason| FieldError::AssetLoad { asset, reason }))
        });

        let on_load = {
            let done = done.clone();
            let image = image.clone();
            Closure::wrap(Box::new(move || finish(&done, Ok(image.clone()))) as Box<dyn FnMut()>)
        };
        let on_error = Closure::wrap(
            Box::new(move || finish(&done, Err("image could not be fetched or decoded".into())))
                as Box<dyn FnMut()>,
        );
        image.set_onload(Some(on_load.as_ref().unchecked_ref()));
        image.set_onerror(Some(on_error.as_ref().unchecked_ref()));
        image.set_src(url);

        Ok(Self {
            image,
            _on_load: on_load,
            _on_error: on_error,
        })
    }
}

impl Drop for ImageLoad {
    fn drop(&mut self) {
        self.image.set_onload(None);
        self.image.set_onerror(None);
    }
}
