//! Delivery of asynchronous completion callbacks.
//!
//! A background run never decides which thread its listener runs on. It hands
//! a boxed callback to a [`CallbackDispatcher`]. Hosts with a UI thread use a
//! [`QueuedDispatcher`] and drain it from that thread.

use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::fmt;
use std::time::{Duration, Instant};

/// A deferred listener invocation.
pub type Callback = Box<dyn FnOnce() + Send>;

/// Decides where completion callbacks run.
pub trait CallbackDispatcher: Send + Sync {
    fn dispatch(&self, callback: Callback);
}

impl fmt::Debug for dyn CallbackDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CallbackDispatcher")
    }
}

/// Runs callbacks on the dispatching thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmediateDispatcher;

impl CallbackDispatcher for ImmediateDispatcher {
    fn dispatch(&self, callback: Callback) {
        callback();
    }
}

/// Queues callbacks until the host drains them.
pub struct QueuedDispatcher {
    sender: Sender<Callback>,
    receiver: Receiver<Callback>,
}

impl QueuedDispatcher {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// Number of queued callbacks.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Run every queued callback. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut count = 0;
        while let Ok(callback) = self.receiver.try_recv() {
            callback();
            count += 1;
        }
        count
    }

    /// Wait up to `timeout` for the first callback, then run everything
    /// queued. Returns how many ran.
    pub fn run_pending_timeout(&self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        match self.receiver.recv_deadline(deadline) {
            Ok(callback) => {
                callback();
                1 + self.run_pending()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }
}

impl Default for QueuedDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackDispatcher for QueuedDispatcher {
    fn dispatch(&self, callback: Callback) {
        // The receiver lives as long as self, so sending cannot fail.
        let _ = self.sender.send(callback);
    }
}

impl fmt::Debug for QueuedDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedDispatcher")
            .field("pending", &self.pending())
            .finish()
    }
}
