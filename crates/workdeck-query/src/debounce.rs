use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;

pub const DEFAULT_DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Trailing-edge debouncer for search-as-you-type. Each `schedule` call
/// supersedes the previous pending one; only the work scheduled last runs,
/// after the configured quiet period.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_DELAY)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn schedule<Fut>(&self, work: Fut)
    where
        Fut: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            time::sleep(delay).await;
            work.await;
        });
        let mut pending = self.pending.lock().expect("debouncer pending lock poisoned");
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    /// Drop the pending invocation, if any, without running it.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().expect("debouncer pending lock poisoned");
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
