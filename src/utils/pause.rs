//! Blocking pauses between requests.
//!
//! Backoff and pacing go through [`Pause`] so tests can swap in a recorder
//! instead of sleeping.

use std::time::Duration;

use async_trait::async_trait;

/// Delay strategy.
#[async_trait]
pub trait Pause: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Wall-clock pause backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
