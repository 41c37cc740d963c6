use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Trailing-edge debouncer: a value is delivered only after `quiet` has
/// passed without another `push`. Each push cancels the pending delivery.
pub struct Debouncer<T> {
    quiet: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(quiet: Duration, tx: mpsc::UnboundedSender<T>) -> Self {
        Self {
            quiet,
            tx,
            pending: None,
        }
    }

    pub fn push(&mut self, value: T) {
        self.cancel();
        let tx = self.tx.clone();
        // Deadline counts from the push, not from when the task first runs.
        let deadline = Instant::now() + self.quiet;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            tx.send(value).ok();
        }));
    }

    /// Drop the pending delivery, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
