//! WASM bridge for the Surface Binder. Drives a `<canvas>` from a JS or
//! Rust draw routine on `requestAnimationFrame`.
//!
//! Compiled via `wasm-pack build --target web`.

pub mod demo;
mod scheduler;
mod surface;

pub use scheduler::WindowScheduler;
pub use surface::HtmlCanvasSurface;

use sb_core::{BindError, SurfaceAttributes, SurfaceBinder, SurfaceRef};
use serde::Serialize;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// A canvas component: owns the binder and the slot holding the mounted
/// `<canvas>`. Freeing it from JS (or dropping it in Rust) stops the loop.
#[wasm_bindgen]
pub struct CanvasView {
    binder: SurfaceBinder<HtmlCanvasSurface, WindowScheduler>,
    slot: SurfaceRef<HtmlCanvasSurface>,
    scheduler: Rc<WindowScheduler>,
}

#[derive(Serialize)]
struct ViewStatus<'a> {
    mounted: bool,
    frame: u64,
    version: Option<u64>,
    pending_frames: usize,
    attributes: &'a SurfaceAttributes,
}

#[wasm_bindgen]
impl CanvasView {
    /// Create an unmounted view. `attributes_json` holds the pass-through
    /// canvas attributes, e.g. `{"width":400,"height":300}`; an empty
    /// string means none.
    #[wasm_bindgen(constructor)]
    pub fn new(attributes_json: &str) -> Result<CanvasView, JsValue> {
        let attributes = SurfaceAttributes::from_json(attributes_json).map_err(to_js)?;
        Self::with_attributes(attributes)
    }

    /// Mount on `canvas` and call `draw(ctx, frame)` every animation frame.
    pub fn mount(
        &mut self,
        canvas: HtmlCanvasElement,
        draw: js_sys::Function,
    ) -> Result<(), JsValue> {
        self.mount_with(canvas, js_draw(draw))
    }

    /// Replace the draw callback. The new callback starts at frame 1.
    pub fn set_draw(&mut self, draw: js_sys::Function) -> Result<(), JsValue> {
        self.binder.rebind(js_draw(draw)).map_err(to_js)
    }

    /// Replace the draw callback only when `version` changed since the
    /// last versioned call. Returns whether the callback was replaced.
    pub fn set_draw_versioned(
        &mut self,
        version: u32,
        draw: js_sys::Function,
    ) -> Result<bool, JsValue> {
        self.binder
            .update(u64::from(version), js_draw(draw))
            .map_err(to_js)
    }

    /// Stop the loop and release the canvas. Safe to call repeatedly.
    pub fn unmount(&mut self) -> bool {
        let was_bound = self.binder.unbind();
        self.slot.detach();
        was_bound
    }

    pub fn is_mounted(&self) -> bool {
        self.binder.is_bound()
    }

    /// Frame counter of the running loop (0 when unmounted).
    pub fn frame(&self) -> f64 {
        self.binder.frame() as f64
    }

    /// JSON snapshot:
    /// `{"mounted":..,"frame":..,"version":..,"pending_frames":..,"attributes":{..}}`.
    pub fn status(&self) -> String {
        let status = ViewStatus {
            mounted: self.binder.is_bound(),
            frame: self.binder.frame(),
            version: self.binder.version(),
            pending_frames: self.scheduler.pending(),
            attributes: self.binder.attributes(),
        };
        serde_json::to_string(&status).unwrap_or_else(|e| {
            log::error!("status serialization failed: {e}");
            String::from("{}")
        })
    }
}

impl CanvasView {
    pub fn with_attributes(attributes: SurfaceAttributes) -> Result<CanvasView, JsValue> {
        init_runtime();
        let scheduler = Rc::new(WindowScheduler::new().map_err(|e| to_js(e.into()))?);
        Ok(Self {
            binder: SurfaceBinder::new(Rc::clone(&scheduler), attributes),
            slot: SurfaceRef::new(),
            scheduler,
        })
    }

    /// Mount with a Rust draw routine.
    pub fn mount_with<D>(&mut self, canvas: HtmlCanvasElement, draw: D) -> Result<(), JsValue>
    where
        D: FnMut(&CanvasRenderingContext2d, u64) + 'static,
    {
        if self.binder.is_bound() {
            return Err(to_js(BindError::AlreadyBound));
        }
        self.slot.attach(HtmlCanvasSurface::new(canvas));
        if let Err(e) = self.binder.bind(&self.slot, draw) {
            self.slot.detach();
            return Err(to_js(e));
        }
        Ok(())
    }

    pub fn canvas(&self) -> Option<&HtmlCanvasElement> {
        self.slot.current().map(HtmlCanvasSurface::element)
    }
}

/// App shell: append a `<canvas>` to the element with id `root_id` and run
/// the pulsing-circle demo on it. Keep the returned view alive for as long
/// as the animation should run.
#[wasm_bindgen]
pub fn mount_demo(root_id: &str) -> Result<CanvasView, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let root = document
        .get_element_by_id(root_id)
        .ok_or_else(|| JsValue::from_str(&format!("no element with id {root_id:?}")))?;
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")?
        .dyn_into()
        .map_err(|_| JsValue::from_str("created element is not a canvas"))?;
    root.append_child(&canvas)?;

    let mut view = CanvasView::with_attributes(demo::default_attributes())?;
    view.mount_with(canvas, demo::pulse)?;
    log::info!("demo mounted in #{root_id}");
    Ok(view)
}

/// Adapt a JS function to a draw routine. An exception thrown by the
/// callback is rethrown unchanged to the host; the next frame is never
/// requested, so the loop ends there.
fn js_draw(draw: js_sys::Function) -> impl FnMut(&CanvasRenderingContext2d, u64) + 'static {
    move |ctx: &CanvasRenderingContext2d, frame: u64| {
        let ctx: &JsValue = ctx.as_ref();
        if let Err(err) = draw.call2(&JsValue::NULL, ctx, &JsValue::from_f64(frame as f64)) {
            wasm_bindgen::throw_val(err);
        }
    }
}

fn to_js(err: BindError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

pub(crate) fn js_error_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn init_runtime() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            console_error_panic_hook::set_once();
            if console_log::init_with_level(log::Level::Debug).is_err() {
                log::debug!("logger already installed");
            }
        });
    }
}
