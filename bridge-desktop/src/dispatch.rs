//! Desktop callback queues
//!
//! - [`MainQueue`]: a single dedicated thread that runs jobs serially in
//!   submission order, standing in for a UI main thread.
//! - [`TokioQueue`]: hands each job to a Tokio runtime as its own task.

use bridge_traits::dispatch::{CallbackQueue, Job};
use bridge_traits::error::{BridgeError, Result};
use parking_lot::Mutex;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle, ThreadId};
use tokio::runtime::Handle;
use tracing::{debug, warn};

/// Serial queue backed by one named OS thread.
///
/// Dropping the queue closes the channel; jobs already queued still run before
/// the thread exits.
pub struct MainQueue {
    sender: Mutex<Option<Sender<Job>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    thread_id: ThreadId,
    label: String,
}

impl MainQueue {
    /// Spawn the queue thread.
    pub fn new() -> Result<Self> {
        Self::with_label("quotedesk-main")
    }

    /// Spawn the queue thread with a custom thread name.
    pub fn with_label(label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        let (sender, receiver) = mpsc::channel::<Job>();

        let worker = thread::Builder::new()
            .name(label.clone())
            .spawn(move || {
                while let Ok(job) = receiver.recv() {
                    job();
                }
            })
            .map_err(|e| BridgeError::NotAvailable(format!("Failed to spawn main queue: {}", e)))?;

        let thread_id = worker.thread().id();
        debug!(label = %label, "Main queue started");

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            thread_id,
            label,
        })
    }

    /// Whether the caller is running on this queue's thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Stop accepting jobs and wait for queued jobs to finish.
    ///
    /// Must not be called from the queue's own thread.
    pub fn shutdown(&self) {
        self.sender.lock().take();
        if self.is_current() {
            return;
        }
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if worker.join().is_err() {
                warn!(label = %self.label, "Main queue thread panicked");
            }
        }
    }
}

impl CallbackQueue for MainQueue {
    fn dispatch(&self, job: Job) {
        let sender = self.sender.lock();
        match sender.as_ref() {
            Some(sender) => {
                if sender.send(job).is_err() {
                    warn!(label = %self.label, "Main queue thread exited; dropping job");
                }
            }
            None => warn!(label = %self.label, "Main queue shut down; dropping job"),
        }
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl Drop for MainQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Runs each job as a Tokio task on the captured runtime.
#[derive(Clone)]
pub struct TokioQueue {
    handle: Handle,
}

impl TokioQueue {
    /// Capture the runtime the caller is currently running on.
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current().map_err(|e| {
            BridgeError::NotAvailable(format!("No Tokio runtime available: {}", e))
        })?;
        Ok(Self { handle })
    }

    pub fn with_handle(handle: Handle) -> Self {
        Self { handle }
    }
}

impl CallbackQueue for TokioQueue {
    fn dispatch(&self, job: Job) {
        self.handle.spawn(async move { job() });
    }

    fn label(&self) -> &str {
        "tokio"
    }
}
