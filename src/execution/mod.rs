//! Asynchronous execution support.
//!
//! Run-state tracking for background validation and the dispatchers that
//! deliver its completion callbacks.

pub mod dispatch;
pub mod task;

pub use dispatch::{Callback, CallbackDispatcher, ImmediateDispatcher, QueuedDispatcher};
pub use task::{AsyncRun, RunState};
