//! Debounced scheduling for search inputs
//!
//! A new call within the debounce window aborts the pending one, so only the
//! most recent input ever runs. Used by the logs view so a keystroke burst
//! triggers a single re-filter.

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Schedule `f` to run after the delay, cancelling any pending call.
    pub fn call(&self, f: impl FnOnce() + Send + 'static) {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            f();
        });
        if let Some(prev) = self.pending.lock().replace(handle) {
            prev.abort();
        }
    }

    /// Drop any pending call without scheduling a new one.
    pub fn cancel(&self) {
        if let Some(prev) = self.pending.lock().take() {
            prev.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        if let Some(prev) = self.pending.lock().take() {
            prev.abort();
        }
    }
}
