//! Shared fixtures: an in-memory canvas that records what happens to it.

#![allow(dead_code)]

use sb_core::{BindError, DrawingSurface, ManualScheduler, SurfaceAttributes, SurfaceBinder};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Everything the draw routines did, in order: `(routine, frame)`.
pub type DrawLog = Rc<RefCell<Vec<(&'static str, u64)>>>;

/// The 2D context handed to draw routines. Clones share the same log.
#[derive(Clone, Default)]
pub struct FakeContext {
    pub log: DrawLog,
}

impl FakeContext {
    pub fn record(&self, routine: &'static str, frame: u64) {
        self.log.borrow_mut().push((routine, frame));
    }

    pub fn frames_of(&self, routine: &str) -> Vec<u64> {
        self.log
            .borrow()
            .iter()
            .filter(|(name, _)| *name == routine)
            .map(|(_, frame)| *frame)
            .collect()
    }
}

/// A canvas element with a size, an attribute bag and one 2D context.
#[derive(Default)]
pub struct FakeCanvas {
    pub width: Cell<u32>,
    pub height: Cell<u32>,
    pub applied: RefCell<Option<SurfaceAttributes>>,
    pub context_calls: Cell<usize>,
    pub context: FakeContext,
}

impl FakeCanvas {
    /// HTML default canvas size.
    pub fn new() -> Self {
        let canvas = Self::default();
        canvas.width.set(300);
        canvas.height.set(150);
        canvas
    }
}

impl DrawingSurface for FakeCanvas {
    type Context = FakeContext;

    fn context(&self) -> Result<FakeContext, BindError> {
        self.context_calls.set(self.context_calls.get() + 1);
        Ok(self.context.clone())
    }

    fn apply_attributes(&self, attributes: &SurfaceAttributes) -> Result<(), BindError> {
        if let Some(width) = attributes.width {
            self.width.set(width);
        }
        if let Some(height) = attributes.height {
            self.height.set(height);
        }
        *self.applied.borrow_mut() = Some(attributes.clone());
        Ok(())
    }
}

pub fn binder(
    attributes: SurfaceAttributes,
) -> (Rc<ManualScheduler>, SurfaceBinder<FakeCanvas, ManualScheduler>) {
    let _ = env_logger::builder().is_test(true).try_init();
    let scheduler = Rc::new(ManualScheduler::new());
    let binder = SurfaceBinder::new(Rc::clone(&scheduler), attributes);
    (scheduler, binder)
}

/// Draw routine that records its name and the frame it was given.
pub fn routine(name: &'static str) -> impl FnMut(&FakeContext, u64) + 'static {
    move |ctx: &FakeContext, frame: u64| ctx.record(name, frame)
}
