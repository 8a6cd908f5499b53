//! Pacing between consecutive lookups.

use async_trait::async_trait;
use std::time::Duration;

/// Waits between lookups so the catalog is not hammered.
#[async_trait]
pub trait RequestPacer: Send + Sync {
    /// Called after a lookup completes, before the next record.
    async fn pause(&self);
}

/// Sleep for a fixed duration after every lookup.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

impl FixedDelay {
    pub fn from_millis(ms: u64) -> Self {
        Self(Duration::from_millis(ms))
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self(Duration::from_secs(1))
    }
}

#[async_trait]
impl RequestPacer for FixedDelay {
    async fn pause(&self) {
        if !self.0.is_zero() {
            tokio::time::sleep(self.0).await;
        }
    }
}
