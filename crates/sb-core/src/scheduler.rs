//! Frame scheduling abstraction.
//!
//! A scheduler accepts a one-shot callback, fires it at the next display
//! refresh opportunity and hands back a [`LoopHandle`] that can cancel the
//! request before it fires. The browser implementation wraps
//! `requestAnimationFrame`; [`ManualScheduler`] fires frames on demand.

use crate::error::ScheduleError;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;

/// One-shot frame callback.
pub type FrameCallback = Box<dyn FnOnce()>;

/// Cancellation token for a pending frame request.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoopHandle(i32);

impl LoopHandle {
    pub fn from_raw(id: i32) -> Self {
        LoopHandle(id)
    }

    /// The host's request id (what `requestAnimationFrame` returned).
    pub fn raw(self) -> i32 {
        self.0
    }
}

impl fmt::Debug for LoopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host animation-scheduling facility.
pub trait FrameScheduler {
    /// Request `callback` to run once at the next frame.
    fn request_frame(&self, callback: FrameCallback) -> Result<LoopHandle, ScheduleError>;

    /// Cancel a pending request. Unknown, fired or already-cancelled
    /// handles are ignored.
    fn cancel_frame(&self, handle: LoopHandle);
}

/// Deterministic scheduler: frames fire only when [`tick`](Self::tick) is
/// called.
#[derive(Default)]
pub struct ManualScheduler {
    queue: RefCell<BTreeMap<LoopHandle, FrameCallback>>,
    next_id: Cell<i32>,
    cancelled: Cell<usize>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every callback that was pending when the tick began.
    /// Requests made while firing are queued for the next tick.
    /// Returns the number of callbacks fired.
    pub fn tick(&self) -> usize {
        let due = std::mem::take(&mut *self.queue.borrow_mut());
        let fired = due.len();
        for (handle, callback) in due {
            log::trace!("tick: firing {handle:?}");
            callback();
        }
        fired
    }

    /// Run `n` ticks, returning the total number of callbacks fired.
    pub fn tick_n(&self, n: usize) -> usize {
        (0..n).map(|_| self.tick()).sum()
    }

    /// Number of outstanding frame requests.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Whether `handle` is still waiting to fire.
    pub fn is_pending(&self, handle: LoopHandle) -> bool {
        self.queue.borrow().contains_key(&handle)
    }

    /// Number of cancellations that actually removed a pending request.
    pub fn cancelled(&self) -> usize {
        self.cancelled.get()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Result<LoopHandle, ScheduleError> {
        // Ids start at 1, like requestAnimationFrame.
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let handle = LoopHandle::from_raw(id);
        self.queue.borrow_mut().insert(handle, callback);
        Ok(handle)
    }

    fn cancel_frame(&self, handle: LoopHandle) {
        let removed = self.queue.borrow_mut().remove(&handle);
        if removed.is_some() {
            self.cancelled.set(self.cancelled.get() + 1);
        }
    }
}
