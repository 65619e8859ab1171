//! Callback Dispatch Queues
//!
//! Completions produced by the core are never invoked on whatever thread
//! happened to finish the work. They are handed to a [`CallbackQueue`] chosen by
//! the caller, mirroring how UI hosts marshal results onto their main thread:
//!
//! - **iOS / macOS**: the main dispatch queue
//! - **Android**: the main `Looper`
//! - **Desktop**: a dedicated UI-affinity thread (`bridge_desktop::MainQueue`)
//! - **Tests**: [`InlineQueue`], which runs jobs on the calling thread

use std::fmt;
use std::sync::Arc;

/// A unit of work scheduled onto a queue.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Serial or concurrent executor for completion callbacks.
///
/// Implementations must run every dispatched job exactly once unless the
/// queue itself has been shut down, in which case jobs may be dropped.
pub trait CallbackQueue: Send + Sync {
    /// Schedule `job` for execution.
    fn dispatch(&self, job: Job);

    /// Human-readable label used in logs.
    fn label(&self) -> &str {
        "callback-queue"
    }
}

impl fmt::Debug for dyn CallbackQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackQueue")
            .field("label", &self.label())
            .finish()
    }
}

/// Runs each job immediately on the dispatching thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineQueue;

impl InlineQueue {
    pub fn shared() -> Arc<dyn CallbackQueue> {
        Arc::new(InlineQueue)
    }
}

impl CallbackQueue for InlineQueue {
    fn dispatch(&self, job: Job) {
        job();
    }

    fn label(&self) -> &str {
        "inline"
    }
}
