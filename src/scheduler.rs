//! Display refresh scheduling.
//!
//! The animation driver never talks to a clock directly. It asks a
//! [`FrameScheduler`] to run a callback on the next display refresh and keeps
//! the returned [`FrameHandle`] so the callback can be cancelled when a new
//! run supersedes it.
//!
//! Two schedulers ship with the crate:
//!
//! - [`CalloopScheduler`] fires callbacks from a `calloop` event loop at the
//!   refresh interval.
//! - [`ManualScheduler`] fires callbacks only when [`ManualScheduler::tick`]
//!   is called, which makes frame-by-frame testing deterministic.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};

use crate::animation::REFRESH_RATE_HZ;

/// Callback run on a display refresh.
pub type FrameCallback = Box<dyn FnOnce()>;

/// Opaque handle to a scheduled, not yet fired, callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

impl FrameHandle {
    /// Create a new unique handle.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        FrameHandle(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw handle value (for debugging/logging).
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Request and cancel one callback per display refresh.
///
/// Implementations must not run the callback from inside `schedule`; it
/// always fires on a later refresh. Cancelling a handle that already fired
/// or was already cancelled is a no-op.
pub trait FrameScheduler {
    fn schedule(&self, callback: FrameCallback) -> FrameHandle;
    fn cancel(&self, handle: FrameHandle);
}

/// Scheduler driven by explicit [`tick`](ManualScheduler::tick) calls.
#[derive(Default)]
pub struct ManualScheduler {
    pending: RefCell<Vec<(FrameHandle, FrameCallback)>>,
    firing: RefCell<VecDeque<(FrameHandle, FrameCallback)>>,
    ticks: Cell<u64>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting for the next tick.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Number of ticks so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }

    /// Simulate one display refresh.
    ///
    /// Fires every callback that was pending when the tick started. Callbacks
    /// scheduled while firing wait for the next tick. Returns the number of
    /// callbacks fired.
    pub fn tick(&self) -> usize {
        self.ticks.set(self.ticks.get() + 1);
        let due = std::mem::take(&mut *self.pending.borrow_mut());
        self.firing.borrow_mut().extend(due);

        let mut fired = 0;
        loop {
            let next = self.firing.borrow_mut().pop_front();
            let Some((_, callback)) = next else {
                break;
            };
            callback();
            fired += 1;
        }
        fired
    }

    /// Tick until nothing is pending or `max_ticks` is reached.
    ///
    /// Returns the number of ticks performed.
    pub fn run_until_idle(&self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.pending() > 0 {
            self.tick();
            ticks += 1;
        }
        ticks
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule(&self, callback: FrameCallback) -> FrameHandle {
        let handle = FrameHandle::next();
        self.pending.borrow_mut().push((handle, callback));
        handle
    }

    fn cancel(&self, handle: FrameHandle) {
        self.pending.borrow_mut().retain(|(h, _)| *h != handle);
        self.firing.borrow_mut().retain(|(h, _)| *h != handle);
    }
}

/// Scheduler backed by one-shot timers on a `calloop` event loop.
pub struct CalloopScheduler<Data: 'static> {
    handle: LoopHandle<'static, Data>,
    interval: Duration,
    tokens: Rc<RefCell<HashMap<FrameHandle, RegistrationToken>>>,
}

impl<Data: 'static> CalloopScheduler<Data> {
    /// Schedule on `handle` at the default refresh rate.
    pub fn new(handle: LoopHandle<'static, Data>) -> Self {
        Self {
            handle,
            interval: Duration::from_secs_f32(1.0 / REFRESH_RATE_HZ),
            tokens: Rc::new(RefCell::new(HashMap::new())),
        }
    }

    /// Override the interval between refreshes.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Number of callbacks registered on the loop and not yet fired.
    pub fn pending(&self) -> usize {
        self.tokens.borrow().len()
    }
}

impl<Data: 'static> FrameScheduler for CalloopScheduler<Data> {
    fn schedule(&self, callback: FrameCallback) -> FrameHandle {
        let frame = FrameHandle::next();
        let tokens = Rc::clone(&self.tokens);
        let mut callback = Some(callback);

        let inserted = self.handle.insert_source(
            Timer::from_duration(self.interval),
            move |_, _, _| {
                tokens.borrow_mut().remove(&frame);
                if let Some(callback) = callback.take() {
                    callback();
                }
                TimeoutAction::Drop
            },
        );

        match inserted {
            Ok(token) => {
                self.tokens.borrow_mut().insert(frame, token);
            }
            Err(err) => log::error!(
                "Failed to schedule frame callback {}: {}",
                frame.raw(),
                err.error
            ),
        }
        frame
    }

    fn cancel(&self, handle: FrameHandle) {
        let token = self.tokens.borrow_mut().remove(&handle);
        if let Some(token) = token {
            self.handle.remove(token);
        }
    }
}
