//! `requestAnimationFrame` scheduler.
//!
//! Each request owns a `Closure` that must stay alive until the browser
//! calls it or the request is cancelled, so pending closures are kept in a
//! map keyed by the request id.

use crate::js_error_message;
use sb_core::{FrameCallback, FrameScheduler, LoopHandle, ScheduleError};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::Window;

type PendingFrames = Rc<RefCell<HashMap<i32, Closure<dyn FnMut()>>>>;

pub struct WindowScheduler {
    window: Window,
    pending: PendingFrames,
}

impl WindowScheduler {
    pub fn new() -> Result<Self, ScheduleError> {
        let window = web_sys::window().ok_or_else(|| ScheduleError("no global window".into()))?;
        Ok(Self {
            window,
            pending: Rc::new(RefCell::new(HashMap::new())),
        })
    }

    /// Requests the browser has not fired yet.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }
}

impl FrameScheduler for WindowScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Result<LoopHandle, ScheduleError> {
        let id = Rc::new(Cell::new(0));
        let id_for_cb = Rc::clone(&id);
        let pending = Rc::clone(&self.pending);
        let mut callback = Some(callback);

        let closure = Closure::wrap(Box::new(move || {
            // Releasing our own Closure here is fine: wasm-bindgen defers
            // the free until this invocation returns.
            let this = pending.borrow_mut().remove(&id_for_cb.get());
            if let Some(callback) = callback.take() {
                callback();
            }
            drop(this);
        }) as Box<dyn FnMut()>);

        let raw = self
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map_err(|e| ScheduleError(js_error_message(&e)))?;
        id.set(raw);
        self.pending.borrow_mut().insert(raw, closure);
        Ok(LoopHandle::from_raw(raw))
    }

    fn cancel_frame(&self, handle: LoopHandle) {
        let removed = self.pending.borrow_mut().remove(&handle.raw());
        let Some(closure) = removed else {
            return;
        };
        if let Err(e) = self.window.cancel_animation_frame(handle.raw()) {
            log::warn!("cancelAnimationFrame({}) failed: {}", handle.raw(), js_error_message(&e));
        }
        drop(closure);
    }
}
