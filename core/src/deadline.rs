//! Per-call deadline: a cancellation token plus the timer that trips it.
//!
//! # Design
//! `Deadline::arm` spawns a single-shot timer task that cancels the token
//! once the timeout elapses. The guard owns the task handle and aborts it on
//! drop, so whichever way the call ends (success, error, or timeout) the
//! timer is gone once the guard goes out of scope.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Returned by [`Deadline::race`] when the token fired first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed;

#[derive(Debug)]
pub struct Deadline {
    token: CancellationToken,
    timer: JoinHandle<()>,
}

impl Deadline {
    /// Start the timer. Must be called from within a tokio runtime.
    pub fn arm(timeout: Duration) -> Self {
        let token = CancellationToken::new();
        let trip = token.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            trip.cancel();
        });
        Self { token, timer }
    }

    #[cfg(test)]
    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    #[cfg(test)]
    pub(crate) fn is_expired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drive `fut` until it completes or the token is cancelled. On
    /// cancellation `fut` is dropped, which aborts whatever it was doing.
    pub async fn race<F: Future>(&self, fut: F) -> Result<F::Output, Elapsed> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Elapsed),
            out = fut => Ok(out),
        }
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        self.timer.abort();
    }
}
