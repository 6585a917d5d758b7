use std::time::Duration;

use async_trait::async_trait;

/// Suspends the run between batches
#[async_trait]
pub trait Throttle: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Pauses by sleeping on the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct SleepThrottle;

#[async_trait]
impl Throttle for SleepThrottle {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
