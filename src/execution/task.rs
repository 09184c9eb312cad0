//! State of one asynchronous validation run.

use crate::validation::listener::AsyncValidationListener;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const RUNNING: u8 = 0;
const CANCELLED: u8 = 1;
const FINISHED: u8 = 2;

/// Three-state cell: `Running` moves once, to `Cancelled` or `Finished`.
#[derive(Debug)]
pub struct RunState {
    state: AtomicU8,
}

impl RunState {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(RUNNING),
        }
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn transition(&self, to: u8) -> bool {
        self.state
            .compare_exchange(RUNNING, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Move to `Cancelled`. Returns `false` if the run already ended.
    pub fn try_cancel(&self) -> bool {
        self.transition(CANCELLED)
    }

    /// Move to `Finished`. Returns `false` if the run was cancelled.
    pub fn try_finish(&self) -> bool {
        self.transition(FINISHED)
    }

    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::Acquire) == RUNNING
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to an in-flight run.
///
/// The worker thread is detached; cancelling only moves the state, and the
/// worker drops its outcome when it sees it.
pub struct AsyncRun {
    pub state: Arc<RunState>,
    pub listener: Arc<dyn AsyncValidationListener>,
}

impl AsyncRun {
    /// Cancel the run and notify its listener on this thread.
    ///
    /// Returns `false` if the run had already ended.
    pub fn cancel(&self) -> bool {
        if self.state.try_cancel() {
            self.listener.on_cancelled();
            true
        } else {
            false
        }
    }
}

impl std::fmt::Debug for AsyncRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncRun")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
