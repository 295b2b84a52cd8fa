//! Surface Binder core. Binds a per-frame draw routine to a 2D drawing
//! surface and keeps the animation loop tied to an explicit bind/unbind
//! lifecycle.
//!
//! Host-independent: the browser bridge lives in `sb-wasm`, headless hosts
//! and tests drive frames with [`ManualScheduler`].

pub mod attributes;
pub mod binder;
pub mod error;
pub mod render_loop;
pub mod scheduler;
pub mod surface;

pub use attributes::SurfaceAttributes;
pub use binder::{BinderState, SurfaceBinder};
pub use error::{BindError, ScheduleError};
pub use render_loop::RenderLoop;
pub use scheduler::{FrameCallback, FrameScheduler, LoopHandle, ManualScheduler};
pub use surface::{DrawingSurface, SurfaceRef};
