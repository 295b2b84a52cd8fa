//! Drawing surface abstraction and the slot the host fills once the
//! surface element exists.

use crate::attributes::SurfaceAttributes;
use crate::error::BindError;

/// A 2D raster surface that can hand out a drawing context.
pub trait DrawingSurface {
    /// The stateful drawing interface given to draw routines.
    type Context: 'static;

    /// Obtain the 2D context. Called once per bind.
    fn context(&self) -> Result<Self::Context, BindError>;

    /// Apply pass-through display attributes to the surface element.
    fn apply_attributes(&self, attributes: &SurfaceAttributes) -> Result<(), BindError>;
}

/// Holds the surface once the host has rendered it. Empty until
/// [`attach`](Self::attach) is called.
#[derive(Debug)]
pub struct SurfaceRef<S> {
    current: Option<S>,
}

impl<S> Default for SurfaceRef<S> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<S> SurfaceRef<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot that already holds `surface`.
    pub fn attached(surface: S) -> Self {
        Self {
            current: Some(surface),
        }
    }

    /// Store the rendered surface, returning the previous one if any.
    pub fn attach(&mut self, surface: S) -> Option<S> {
        self.current.replace(surface)
    }

    pub fn detach(&mut self) -> Option<S> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&S> {
        self.current.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.current.is_some()
    }
}
