//! Trailing-edge debounce on the tokio runtime

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Runs the most recently scheduled task once no newer one has arrived for
/// the given delay.
///
/// Only the waiting period is cancellable. Once the delay elapses the task is
/// detached, so a later `schedule` or `cancel` never aborts work in progress.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` after `delay`, replacing any pending one
    pub fn schedule<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            log::warn!("No async runtime available; debounced task dropped");
            return;
        };

        let timer = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(task);
        });

        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.replace(timer) {
                previous.abort();
            }
        }
    }

    /// Drop the pending task. Returns true if one was still waiting.
    pub fn cancel(&self) -> bool {
        let Ok(mut pending) = self.pending.lock() else {
            return false;
        };
        match pending.take() {
            Some(timer) if !timer.is_finished() => {
                timer.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .map(|pending| pending.as_ref().is_some_and(|timer| !timer.is_finished()))
            .unwrap_or(false)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(timer) = pending.take() {
                timer.abort();
            }
        }
    }
}
