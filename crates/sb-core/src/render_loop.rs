//! Self-rescheduling render loop.
//!
//! Each frame bumps the counter, calls the draw routine with the shared
//! context, then asks the scheduler for the next frame. Frame rate follows
//! the scheduler; draw routines get an ordinal, never elapsed time.
//!
//! No borrow of the loop state is held while the draw routine runs, so a
//! routine may read the counter, stop the loop or replace itself. A panic or
//! thrown error escaping the routine skips the reschedule and the loop ends.
//!
//! Scheduled callbacks only hold a `Weak` pointer to the loop state. Once
//! [`RenderLoop::stop`] drops the state, a callback the host failed to cancel
//! finds nothing to run.

use crate::error::ScheduleError;
use crate::scheduler::{FrameScheduler, LoopHandle};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type DrawFn<C> = Box<dyn FnMut(&C, u64)>;

struct LoopState<C> {
    context: Rc<C>,
    /// Taken out for the duration of each draw call.
    draw: RefCell<Option<DrawFn<C>>>,
    frame: Cell<u64>,
    pending: Cell<Option<LoopHandle>>,
    stopped: Cell<bool>,
}

/// An owned animation loop over a drawing context.
pub struct RenderLoop<C: 'static, F: FrameScheduler + 'static> {
    scheduler: Rc<F>,
    context: Rc<C>,
    state: Option<Rc<LoopState<C>>>,
}

impl<C: 'static, F: FrameScheduler + 'static> RenderLoop<C, F> {
    pub fn new(scheduler: Rc<F>, context: Rc<C>) -> Self {
        Self {
            scheduler,
            context,
            state: None,
        }
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    /// Start drawing with `draw`, replacing any running routine. The frame
    /// counter restarts at 0 and the first frame is scheduled, not run.
    pub fn start<D>(&mut self, draw: D) -> Result<(), ScheduleError>
    where
        D: FnMut(&C, u64) + 'static,
    {
        self.stop();

        let state = Rc::new(LoopState {
            context: Rc::clone(&self.context),
            draw: RefCell::new(Some(Box::new(draw))),
            frame: Cell::new(0),
            pending: Cell::new(None),
            stopped: Cell::new(false),
        });
        let handle = request_next(&state, &self.scheduler)?;
        state.pending.set(Some(handle));
        self.state = Some(state);

        log::debug!("render loop started, first frame {handle:?}");
        Ok(())
    }

    /// Cancel the pending frame and drop the routine. Returns `false` when
    /// there was nothing to stop.
    pub fn stop(&mut self) -> bool {
        let Some(state) = self.state.take() else {
            return false;
        };
        state.stopped.set(true);
        let pending = state.pending.take();
        if let Some(handle) = pending {
            self.scheduler.cancel_frame(handle);
        }
        // Empty while the routine is mid-call; run_frame drops it afterwards.
        let routine = state.draw.borrow_mut().take();
        drop(routine);
        log::debug!(
            "render loop stopped after {} frames (cancelled {:?})",
            state.frame.get(),
            pending
        );
        true
    }

    /// Whether a next frame is scheduled.
    pub fn is_running(&self) -> bool {
        self.pending_handle().is_some()
    }

    /// Value passed to the most recent draw call, 0 before the first frame.
    pub fn frame(&self) -> u64 {
        self.state.as_ref().map_or(0, |s| s.frame.get())
    }

    pub fn pending_handle(&self) -> Option<LoopHandle> {
        self.state.as_ref().and_then(|s| s.pending.get())
    }
}

impl<C: 'static, F: FrameScheduler + 'static> Drop for RenderLoop<C, F> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn request_next<C: 'static, F: FrameScheduler + 'static>(
    state: &Rc<LoopState<C>>,
    scheduler: &Rc<F>,
) -> Result<LoopHandle, ScheduleError> {
    let weak = Rc::downgrade(state);
    let sched = Rc::clone(scheduler);
    scheduler.request_frame(Box::new(move || run_frame(&weak, &sched)))
}

fn run_frame<C: 'static, F: FrameScheduler + 'static>(
    weak: &Weak<LoopState<C>>,
    scheduler: &Rc<F>,
) {
    let Some(state) = weak.upgrade() else {
        log::trace!("frame fired for a stopped loop, ignoring");
        return;
    };
    let routine = state.draw.borrow_mut().take();
    let Some(mut draw) = routine else {
        return;
    };

    state.pending.set(None);
    let frame = state.frame.get() + 1;
    state.frame.set(frame);
    draw(&*state.context, frame);
    log::trace!("drew frame {frame}");

    if state.stopped.get() {
        log::trace!("loop stopped during frame {frame}");
        return;
    }
    *state.draw.borrow_mut() = Some(draw);

    match request_next(&state, scheduler) {
        Ok(handle) => state.pending.set(Some(handle)),
        Err(err) => log::error!("render loop halted after frame {frame}: {err}"),
    }
}
