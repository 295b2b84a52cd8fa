//! Display attributes passed straight through to the drawing surface.
//!
//! The binder never interprets these; it hands them to
//! [`DrawingSurface::apply_attributes`](crate::DrawingSurface::apply_attributes)
//! at bind time. They are not visible to draw routines.

use crate::error::BindError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Size, styling and any other element attributes for the surface.
///
/// JSON form: `{"width":400,"height":300,"style":"...","class":"..."}`.
/// Any other key is collected into `extra` and must map to a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Inline CSS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(rename = "class", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl SurfaceAttributes {
    /// Attributes with only a size set.
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Parse from JSON. An empty or whitespace-only string yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, BindError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, BindError> {
        Ok(serde_json::to_string(self)?)
    }
}
