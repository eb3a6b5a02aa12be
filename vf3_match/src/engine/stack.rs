//! Work stacks and the termination-detection protocol shared by the
//! parallel engines.
//!
//! The shared stack is a mutex-protected LIFO of owned states. Worker
//! activity is tracked alongside it: `active_workers` counts the workers
//! that currently hold shared work, and each worker keeps a private
//! `was_idle` flag that is only ever read or written inside this module's
//! critical sections. A worker may exit exactly when the stack is empty
//! and no worker is active, because only an active worker can still push
//! states for others to consume.
//!
//! An empty-handed worker parks on a condition variable that is signalled
//! on every push and broadcast when the active count reaches zero, so
//! nobody spins on the mutex while waiting for work.

use std::sync::{Condvar, Mutex};

use tracing::trace;

struct SharedInner<S> {
    states: Vec<S>,
    active_workers: isize,
}

/// Mutex-protected LIFO of owned states with worker-activity bookkeeping.
pub(crate) struct SharedStack<S> {
    inner: Mutex<SharedInner<S>>,
    work_ready: Condvar,
}

impl<S> SharedStack<S> {
    pub(crate) fn new() -> Self {
        SharedStack {
            inner: Mutex::new(SharedInner {
                states: Vec::new(),
                active_workers: 0,
            }),
            work_ready: Condvar::new(),
        }
    }

    /// Push a state, transferring its ownership to the stack, and wake one
    /// parked worker.
    pub(crate) fn push(&self, state: S) {
        let mut inner = self.inner.lock().unwrap();
        inner.states.push(state);
        drop(inner);
        self.work_ready.notify_one();
    }

    /// Pop a state for the calling worker, or conclude that the search is
    /// over.
    ///
    /// Blocks while the stack is empty but other workers are still
    /// active. Returns `None` only when no state remains anywhere and no
    /// worker can produce one, at which point this worker's activity claim
    /// has already been released.
    pub(crate) fn take(&self, was_idle: &mut bool) -> Option<S> {
        let mut inner = self.inner.lock().unwrap();
        loop {
            if let Some(state) = inner.states.pop() {
                if *was_idle {
                    inner.active_workers += 1;
                    *was_idle = false;
                }
                return Some(state);
            }

            if !*was_idle {
                inner.active_workers -= 1;
                *was_idle = true;
                if inner.active_workers <= 0 {
                    // Last active worker ran dry: every parked worker must
                    // observe the zero and exit.
                    self.work_ready.notify_all();
                    return None;
                }
            } else if inner.active_workers <= 0 {
                return None;
            }

            trace!("worker idle: waiting for shared work");
            inner = self.work_ready.wait(inner).unwrap();
        }
    }

    /// Release the caller's activity claim without popping, for exit
    /// paths that bypass [`take`](SharedStack::take) (early stop).
    pub(crate) fn retire(&self, was_idle: &mut bool) {
        if *was_idle {
            return;
        }
        let mut inner = self.inner.lock().unwrap();
        inner.active_workers -= 1;
        *was_idle = true;
        if inner.active_workers <= 0 {
            self.work_ready.notify_all();
        }
    }

    /// Drop every queued state.
    pub(crate) fn clear(&self) {
        self.inner.lock().unwrap().states.clear();
    }

    /// Number of queued states.
    pub(crate) fn len(&self) -> usize {
        self.inner.lock().unwrap().states.len()
    }

    /// Workers currently counted as holding shared work.
    pub(crate) fn active_workers(&self) -> isize {
        self.inner.lock().unwrap().active_workers
    }
}

/// Per-worker LIFO; owned by exactly one worker, so no locking.
pub(crate) struct LocalStack<S> {
    states: Vec<S>,
}

impl<S> LocalStack<S> {
    pub(crate) fn new() -> Self {
        LocalStack { states: Vec::new() }
    }

    pub(crate) fn push(&mut self, state: S) {
        self.states.push(state);
    }

    pub(crate) fn pop(&mut self) -> Option<S> {
        self.states.pop()
    }

    pub(crate) fn len(&self) -> usize {
        self.states.len()
    }

    pub(crate) fn clear(&mut self) {
        self.states.clear();
    }
}
