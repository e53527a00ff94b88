use std::sync::Arc;
use tokio::sync::{AcquireError, Semaphore};
use tokio::time::{sleep, Duration, Instant};

/// Paces outbound calls to the lap data provider: bounds the number of calls
/// in flight and spaces their start times.
#[derive(Clone)]
pub struct RateLimiter {
    semaphore: Arc<Semaphore>,
    min_delay: Duration,
    last_request: Arc<tokio::sync::Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_concurrent: usize, min_delay_ms: u64) -> Self {
        RateLimiter {
            semaphore: Arc::new(Semaphore::new(max_concurrent.max(1))),
            min_delay: Duration::from_millis(min_delay_ms),
            last_request: Arc::new(tokio::sync::Mutex::new(None)),
        }
    }

    /// Waits for a free slot and for the minimum delay since the previous
    /// call. The slot is held until the returned guard is dropped.
    pub async fn acquire(&self) -> Result<RateLimitGuard, AcquireError> {
        let permit = self.semaphore.clone().acquire_owned().await?;

        let mut last_request = self.last_request.lock().await;
        if let Some(last) = *last_request {
            let elapsed = last.elapsed();
            if elapsed < self.min_delay {
                let wait_time = self.min_delay - elapsed;
                tracing::debug!("Provider pacing: waiting {:?}", wait_time);
                sleep(wait_time).await;
            }
        }
        *last_request = Some(Instant::now());
        drop(last_request);

        Ok(RateLimitGuard { _permit: permit })
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

pub struct RateLimitGuard {
    _permit: tokio::sync::OwnedSemaphorePermit,
}
