use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Enforces a minimum interval between outgoing requests to one source server.
#[derive(Clone)]
pub struct RequestPacer {
    limiter: Arc<DirectRateLimiter>,
    interval: Duration,
}

impl RequestPacer {
    /// Returns `None` for a zero interval, which means "no pacing".
    pub fn new(min_interval: Duration) -> Option<Self> {
        let quota = Quota::with_period(min_interval)?.allow_burst(NonZeroU32::MIN);
        Some(Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
            interval: min_interval,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until the next request slot is available.
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}

impl std::fmt::Debug for RequestPacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPacer")
            .field("interval", &self.interval)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_disables_pacing() {
        assert!(RequestPacer::new(Duration::ZERO).is_none());
    }

    #[tokio::test]
    async fn second_request_inside_the_interval_is_held_back() {
        let pacer = RequestPacer::new(Duration::from_secs(60)).expect("non-zero interval");

        pacer.wait().await;
        let second = tokio::time::timeout(Duration::from_millis(50), pacer.wait()).await;
        assert!(second.is_err(), "second slot must not open before the interval");
    }

    #[tokio::test]
    async fn wait_returns_once_a_slot_frees_up() {
        let pacer = RequestPacer::new(Duration::from_millis(20)).expect("non-zero interval");

        pacer.wait().await;
        let started = std::time::Instant::now();
        pacer.wait().await;
        assert!(started.elapsed() >= Duration::from_millis(10));
    }
}
