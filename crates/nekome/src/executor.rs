//! Execution contexts for the workflow controller.
//!
//! Two contexts replace the scheduler pair of the reactive world: background
//! work is spawned on a tokio runtime handle, and completion callbacks are
//! posted to a [`MainLoop`] that stands in for the UI thread. A
//! [`CancelToken`] checked on the main-loop side guarantees that nothing
//! observable happens after disposal, even when the background task has
//! already finished and posted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// A unit of work marshaled onto the main loop
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// The UI-thread stand-in: a queue of posted closures
pub struct MainLoop {
    tx: UnboundedSender<Task>,
    rx: UnboundedReceiver<Task>,
}

impl Default for MainLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl MainLoop {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Handle used to post work onto this loop from any thread
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher {
            tx: self.tx.clone(),
        }
    }

    /// Wait for the next posted task and run it
    pub async fn run_one(&mut self) -> bool {
        match self.rx.recv().await {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Run everything currently queued without waiting; returns the count
    pub fn drain(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }
}

/// Cloneable posting handle for a [`MainLoop`]
#[derive(Clone)]
pub struct Dispatcher {
    tx: UnboundedSender<Task>,
}

impl Dispatcher {
    /// Queue a closure; silently dropped if the loop is gone
    pub fn post(&self, task: impl FnOnce() + Send + 'static) {
        let _ = self.tx.send(Box::new(task));
    }
}

/// Cooperative cancellation flag shared between a task and its owner
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Owns one in-flight background task; cancels it on drop.
///
/// Aborting the join handle stops work that has not completed; the token
/// covers the window where a completion closure is already queued.
pub struct TaskGuard {
    handle: JoinHandle<()>,
    token: CancelToken,
}

impl TaskGuard {
    pub fn new(handle: JoinHandle<()>, token: CancelToken) -> Self {
        Self { handle, token }
    }

    pub fn cancel(&self) {
        self.token.cancel();
        self.handle.abort();
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.token.cancel();
        self.handle.abort();
    }
}
