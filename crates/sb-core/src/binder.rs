//! The Surface Binder state machine.
//!
//! ```text
//!            bind                 unbind / drop
//!  Unbound ─────────▶ Bound ───────────────────▶ Unbound
//!                     │  ▲
//!                     └──┘ rebind / update (new version)
//! ```
//!
//! Binding applies the display attributes, takes the surface's 2D context
//! once, and starts a [`RenderLoop`]. Rebinding swaps the draw routine and
//! restarts the frame counter while keeping the same context. Unbinding
//! cancels the pending frame before anything else is released, and runs on
//! drop.

use crate::attributes::SurfaceAttributes;
use crate::error::BindError;
use crate::render_loop::RenderLoop;
use crate::scheduler::{FrameScheduler, LoopHandle};
use crate::surface::{DrawingSurface, SurfaceRef};
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinderState {
    Unbound,
    Bound,
}

struct Binding<C: 'static, F: FrameScheduler + 'static> {
    render_loop: RenderLoop<C, F>,
    /// Caller-supplied version of the current draw routine.
    version: Option<u64>,
}

pub struct SurfaceBinder<S: DrawingSurface, F: FrameScheduler + 'static> {
    scheduler: Rc<F>,
    attributes: SurfaceAttributes,
    binding: Option<Binding<S::Context, F>>,
}

impl<S: DrawingSurface, F: FrameScheduler + 'static> SurfaceBinder<S, F> {
    pub fn new(scheduler: Rc<F>, attributes: SurfaceAttributes) -> Self {
        Self {
            scheduler,
            attributes,
            binding: None,
        }
    }

    pub fn state(&self) -> BinderState {
        if self.binding.is_some() {
            BinderState::Bound
        } else {
            BinderState::Unbound
        }
    }

    pub fn is_bound(&self) -> bool {
        self.state() == BinderState::Bound
    }

    pub fn attributes(&self) -> &SurfaceAttributes {
        &self.attributes
    }

    /// Replace the display attributes. Applied on the next bind.
    pub fn set_attributes(&mut self, attributes: SurfaceAttributes) {
        self.attributes = attributes;
    }

    /// The context acquired at bind time.
    pub fn context(&self) -> Option<&S::Context> {
        self.binding.as_ref().map(|b| b.render_loop.context())
    }

    /// Current frame counter, 0 when unbound.
    pub fn frame(&self) -> u64 {
        self.binding.as_ref().map_or(0, |b| b.render_loop.frame())
    }

    pub fn pending_handle(&self) -> Option<LoopHandle> {
        self.binding
            .as_ref()
            .and_then(|b| b.render_loop.pending_handle())
    }

    /// Version recorded by [`bind_versioned`](Self::bind_versioned) or
    /// [`update`](Self::update).
    pub fn version(&self) -> Option<u64> {
        self.binding.as_ref().and_then(|b| b.version)
    }

    /// Bind to the surface in `slot` and start drawing with `draw`.
    ///
    /// Fails with [`BindError::SurfaceUnavailable`] when nothing has been
    /// attached to the slot yet.
    pub fn bind<D>(&mut self, slot: &SurfaceRef<S>, draw: D) -> Result<(), BindError>
    where
        D: FnMut(&S::Context, u64) + 'static,
    {
        self.bind_inner(slot, None, draw)
    }

    /// Like [`bind`](Self::bind), recording `version` for later
    /// [`update`](Self::update) calls.
    pub fn bind_versioned<D>(
        &mut self,
        slot: &SurfaceRef<S>,
        version: u64,
        draw: D,
    ) -> Result<(), BindError>
    where
        D: FnMut(&S::Context, u64) + 'static,
    {
        self.bind_inner(slot, Some(version), draw)
    }

    fn bind_inner<D>(
        &mut self,
        slot: &SurfaceRef<S>,
        version: Option<u64>,
        draw: D,
    ) -> Result<(), BindError>
    where
        D: FnMut(&S::Context, u64) + 'static,
    {
        if self.binding.is_some() {
            return Err(BindError::AlreadyBound);
        }
        let surface = slot.current().ok_or(BindError::SurfaceUnavailable)?;

        surface.apply_attributes(&self.attributes)?;
        let context = Rc::new(surface.context()?);

        let mut render_loop = RenderLoop::new(Rc::clone(&self.scheduler), context);
        render_loop.start(draw)?;
        self.binding = Some(Binding {
            render_loop,
            version,
        });

        log::debug!("surface bound (version {version:?})");
        Ok(())
    }

    /// Swap in a new draw routine. The old routine gets no further frames;
    /// the new one starts again from frame 1 on the same context.
    pub fn rebind<D>(&mut self, draw: D) -> Result<(), BindError>
    where
        D: FnMut(&S::Context, u64) + 'static,
    {
        self.rebind_inner(None, draw)
    }

    /// Rebind only if `version` differs from the recorded one.
    /// Returns whether a rebind happened.
    pub fn update<D>(&mut self, version: u64, draw: D) -> Result<bool, BindError>
    where
        D: FnMut(&S::Context, u64) + 'static,
    {
        if self.version() == Some(version) {
            return Ok(false);
        }
        self.rebind_inner(Some(version), draw)?;
        Ok(true)
    }

    fn rebind_inner<D>(&mut self, version: Option<u64>, draw: D) -> Result<(), BindError>
    where
        D: FnMut(&S::Context, u64) + 'static,
    {
        let binding = self.binding.as_mut().ok_or(BindError::NotBound)?;
        // Recorded only once the new routine is scheduled.
        binding.version = None;
        binding.render_loop.start(draw)?;
        binding.version = version;
        log::debug!("draw routine replaced (version {version:?})");
        Ok(())
    }

    /// Cancel the loop and release the context. Returns `false` if the
    /// binder was already unbound.
    pub fn unbind(&mut self) -> bool {
        let Some(mut binding) = self.binding.take() else {
            return false;
        };
        binding.render_loop.stop();
        drop(binding);
        log::debug!("surface unbound");
        true
    }
}

impl<S: DrawingSurface, F: FrameScheduler + 'static> Drop for SurfaceBinder<S, F> {
    fn drop(&mut self) {
        self.unbind();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    /// Surface whose context is a copy of its id.
    struct Plain {
        id: u32,
        contexts: Cell<usize>,
    }

    impl Plain {
        fn new(id: u32) -> Self {
            Self {
                id,
                contexts: Cell::new(0),
            }
        }
    }

    impl DrawingSurface for Plain {
        type Context = u32;

        fn context(&self) -> Result<u32, BindError> {
            self.contexts.set(self.contexts.get() + 1);
            Ok(self.id)
        }

        fn apply_attributes(&self, _attributes: &SurfaceAttributes) -> Result<(), BindError> {
            Ok(())
        }
    }

    /// Surface that refuses to hand out a context.
    struct NoContext;

    impl DrawingSurface for NoContext {
        type Context = ();

        fn context(&self) -> Result<(), BindError> {
            Err(BindError::ContextUnavailable("webgl only".into()))
        }

        fn apply_attributes(&self, _attributes: &SurfaceAttributes) -> Result<(), BindError> {
            Ok(())
        }
    }

    fn fixture<S: DrawingSurface>() -> (Rc<ManualScheduler>, SurfaceBinder<S, ManualScheduler>) {
        let scheduler = Rc::new(ManualScheduler::new());
        let binder = SurfaceBinder::new(Rc::clone(&scheduler), SurfaceAttributes::default());
        (scheduler, binder)
    }

    #[test]
    fn starts_unbound() {
        let (_, binder) = fixture::<Plain>();
        assert_eq!(binder.state(), BinderState::Unbound);
        assert_eq!(binder.frame(), 0);
        assert!(binder.context().is_none());
    }

    #[test]
    fn bind_without_surface_fails_loudly() {
        let (scheduler, mut binder) = fixture::<Plain>();
        let slot = SurfaceRef::new();

        let err = binder.bind(&slot, |_, _| {}).unwrap_err();

        assert_eq!(err, BindError::SurfaceUnavailable);
        assert_eq!(binder.state(), BinderState::Unbound);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn context_failure_leaves_binder_unbound() {
        let (scheduler, mut binder) = fixture::<NoContext>();
        let slot = SurfaceRef::attached(NoContext);

        let err = binder.bind(&slot, |_, _| {}).unwrap_err();

        assert!(matches!(err, BindError::ContextUnavailable(_)));
        assert!(!binder.is_bound());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn double_bind_is_rejected() {
        let (scheduler, mut binder) = fixture::<Plain>();
        let slot = SurfaceRef::attached(Plain::new(7));

        binder.bind(&slot, |_, _| {}).unwrap();
        let err = binder.bind(&slot, |_, _| {}).unwrap_err();

        assert_eq!(err, BindError::AlreadyBound);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(binder.context(), Some(&7));
    }

    #[test]
    fn rebind_requires_binding() {
        let (_, mut binder) = fixture::<Plain>();
        assert_eq!(binder.rebind(|_, _| {}).unwrap_err(), BindError::NotBound);
        assert_eq!(binder.update(1, |_, _| {}).unwrap_err(), BindError::NotBound);
    }

    #[test]
    fn update_with_same_version_keeps_running_loop() {
        let (scheduler, mut binder) = fixture::<Plain>();
        let slot = SurfaceRef::attached(Plain::new(1));
        let calls = Rc::new(Cell::new(0u32));

        let sink = Rc::clone(&calls);
        binder
            .bind_versioned(&slot, 3, move |_, _| sink.set(sink.get() + 1))
            .unwrap();
        scheduler.tick_n(4);

        assert!(!binder.update(3, |_, _| panic!("must not be installed")).unwrap());
        scheduler.tick_n(2);
        assert_eq!(binder.frame(), 6);
        assert_eq!(calls.get(), 6);

        assert!(binder.update(4, |_, _| {}).unwrap());
        assert_eq!(binder.version(), Some(4));
        scheduler.tick();
        assert_eq!(binder.frame(), 1);
        assert_eq!(calls.get(), 6);
    }

    #[test]
    fn plain_rebind_clears_version() {
        let (_, mut binder) = fixture::<Plain>();
        let slot = SurfaceRef::attached(Plain::new(1));
        binder.bind_versioned(&slot, 9, |_, _| {}).unwrap();

        binder.rebind(|_, _| {}).unwrap();

        assert_eq!(binder.version(), None);
    }

    #[test]
    fn rebinding_after_unbind_takes_a_fresh_context() {
        let (_, mut binder) = fixture::<Plain>();
        let slot = SurfaceRef::attached(Plain::new(2));

        binder.bind(&slot, |_, _| {}).unwrap();
        assert!(binder.unbind());
        assert!(!binder.unbind());
        binder.bind(&slot, |_, _| {}).unwrap();

        assert_eq!(slot.current().map(|s| s.contexts.get()), Some(2));
    }

    /// Manual scheduler that can be told to refuse requests.
    #[derive(Default)]
    struct Flaky {
        inner: ManualScheduler,
        refuse: Cell<bool>,
    }

    impl FrameScheduler for Flaky {
        fn request_frame(
            &self,
            callback: crate::scheduler::FrameCallback,
        ) -> Result<LoopHandle, crate::error::ScheduleError> {
            if self.refuse.get() {
                return Err(crate::error::ScheduleError("page hidden".into()));
            }
            self.inner.request_frame(callback)
        }

        fn cancel_frame(&self, handle: LoopHandle) {
            self.inner.cancel_frame(handle);
        }
    }

    #[test]
    fn failed_update_does_not_record_version() {
        let scheduler = Rc::new(Flaky::default());
        let mut binder: SurfaceBinder<Plain, Flaky> =
            SurfaceBinder::new(Rc::clone(&scheduler), SurfaceAttributes::default());
        let slot = SurfaceRef::attached(Plain::new(1));
        binder.bind_versioned(&slot, 1, |_, _| {}).unwrap();

        scheduler.refuse.set(true);
        let err = binder.update(2, |_, _| {}).unwrap_err();
        assert!(matches!(err, BindError::Schedule(_)), "got {err:?}");
        assert_eq!(binder.version(), None);
        assert_eq!(binder.pending_handle(), None);

        scheduler.refuse.set(false);
        assert!(binder.update(2, |_, _| {}).unwrap());
        assert_eq!(binder.version(), Some(2));
        scheduler.inner.tick();
        assert_eq!(binder.frame(), 1);
    }
}
