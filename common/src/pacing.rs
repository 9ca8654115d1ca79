// Pacing between external calls
//
// The search API quota and the webhook rate limit both assume a slow,
// sequential poller. The delay lives behind a trait so tests can run
// without real time passing.

use async_trait::async_trait;
use std::time::Duration;

/// Rate-limiting seam for the announcement pipeline
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Pause before the next external call.
    async fn pause(&self);
}

/// Pacer that sleeps for a fixed delay
pub struct FixedDelayPacer {
    delay: Duration,
}

impl FixedDelayPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl Pacer for FixedDelayPacer {
    async fn pause(&self) {
        tokio::time::sleep(self.delay).await;
    }
}

/// Pacer that returns immediately, for tests
pub struct NoopPacer;

#[async_trait]
impl Pacer for NoopPacer {
    async fn pause(&self) {}
}
