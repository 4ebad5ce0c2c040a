//! Fixed-delay throttle for followed-link fetches
//!
//! The throttle keeps at least `delay` between the end of one fetch and the
//! start of the next. The wait is cancellable.

use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    last_fetch: Option<Instant>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_fetch: None,
        }
    }

    /// Waits until the next fetch may start
    ///
    /// Returns immediately before the first fetch. Returns `false` if `cancel`
    /// fired before or during the wait.
    pub async fn ready(&self, cancel: &CancellationToken) -> bool {
        if let Some(last) = self.last_fetch {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return false,
                _ = sleep_until(last + self.delay) => {}
            }
        }
        !cancel.is_cancelled()
    }

    /// Records that a fetch just finished
    pub fn mark(&mut self) {
        self.last_fetch = Some(Instant::now());
    }
}
