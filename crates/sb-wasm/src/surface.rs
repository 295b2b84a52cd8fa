//! `<canvas>` element as a drawing surface.

use crate::js_error_message;
use sb_core::{BindError, DrawingSurface, SurfaceAttributes};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub struct HtmlCanvasSurface {
    canvas: HtmlCanvasElement,
}

impl HtmlCanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas }
    }

    pub fn element(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn set_attribute(&self, name: &str, value: &str) -> Result<(), BindError> {
        self.canvas
            .set_attribute(name, value)
            .map_err(|e| BindError::Attributes(format!("{name}: {}", js_error_message(&e))))
    }
}

impl DrawingSurface for HtmlCanvasSurface {
    type Context = CanvasRenderingContext2d;

    fn context(&self) -> Result<CanvasRenderingContext2d, BindError> {
        self.canvas
            .get_context("2d")
            .map_err(|e| BindError::ContextUnavailable(js_error_message(&e)))?
            .ok_or_else(|| {
                BindError::ContextUnavailable("canvas already has a non-2d context".into())
            })?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| BindError::ContextUnavailable("not a CanvasRenderingContext2d".into()))
    }

    fn apply_attributes(&self, attributes: &SurfaceAttributes) -> Result<(), BindError> {
        if let Some(width) = attributes.width {
            self.canvas.set_width(width);
        }
        if let Some(height) = attributes.height {
            self.canvas.set_height(height);
        }
        if let Some(ref style) = attributes.style {
            self.set_attribute("style", style)?;
        }
        if let Some(ref class_name) = attributes.class_name {
            self.canvas.set_class_name(class_name);
        }
        for (name, value) in &attributes.extra {
            self.set_attribute(name, value)?;
        }
        log::trace!("applied canvas attributes {attributes:?}");
        Ok(())
    }
}
