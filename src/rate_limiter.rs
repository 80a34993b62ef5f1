use crate::config::ThrottleConfig;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::debug;

/// Minimum-interval limiter: a unit of work starts no sooner than `interval`
/// after the previous one finished. The first unit never waits.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    state: Arc<Mutex<SpacingState>>,
    interval: Duration,
}

#[derive(Debug)]
struct SpacingState {
    /// Start of the last acquisition, moved to its end on release
    last_mark: Option<Instant>,
    acquisitions: u64,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(SpacingState {
                last_mark: None,
                acquisitions: 0,
            })),
            interval,
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn remaining(state: &SpacingState, interval: Duration, now: Instant) -> Duration {
        match state.last_mark {
            Some(last) => interval.saturating_sub(now.duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Wait until the interval since the previous mark has elapsed.
    pub async fn acquire(&self) {
        loop {
            let mut state = self.state.lock().await;

            let now = Instant::now();
            let wait = Self::remaining(&state, self.interval, now);

            if wait.is_zero() {
                state.last_mark = Some(now);
                state.acquisitions += 1;
                debug!(
                    "Rate limiter: acquisition #{} (interval {:?})",
                    state.acquisitions, self.interval
                );
                return;
            }

            debug!("Rate limit: waiting {:?} before next call", wait);

            // Release lock while waiting
            drop(state);
            sleep(wait).await;
        }
    }

    /// Mark the current unit of work as finished; the next acquisition is
    /// spaced from now.
    pub async fn release(&self) {
        self.state.lock().await.last_mark = Some(Instant::now());
    }

    /// Acquire, run `work` to completion, then release.
    pub async fn run<F: Future>(&self, work: F) -> F::Output {
        self.acquire().await;
        let output = work.await;
        self.release().await;
        output
    }

    pub async fn acquisitions(&self) -> u64 {
        self.state.lock().await.acquisitions
    }
}

/// The named throttles used by the aggregation workflows
#[derive(Debug, Clone)]
pub struct SmartPingRateLimiter {
    team_limiter: RateLimiter,
    player_limiter: RateLimiter,
    batch_limiter: RateLimiter,
}

impl SmartPingRateLimiter {
    pub fn new(config: &ThrottleConfig) -> Self {
        Self {
            team_limiter: RateLimiter::from_millis(config.team_interval_ms),
            player_limiter: RateLimiter::from_millis(config.player_interval_ms),
            batch_limiter: RateLimiter::from_millis(config.batch_interval_ms),
        }
    }

    pub fn unthrottled() -> Self {
        Self::new(&ThrottleConfig::unthrottled())
    }

    /// Process one team of a club, paced after the previous team
    pub async fn throttle_team<F: Future>(&self, work: F) -> F::Output {
        self.team_limiter.run(work).await
    }

    /// Look up one player rating, paced after the previous lookup
    pub async fn throttle_player<F: Future>(&self, work: F) -> F::Output {
        self.player_limiter.run(work).await
    }

    /// Run one synchronization batch, paced after the previous batch
    pub async fn throttle_batch<F: Future>(&self, work: F) -> F::Output {
        self.batch_limiter.run(work).await
    }

    pub fn team_limiter(&self) -> &RateLimiter {
        &self.team_limiter
    }

    pub fn player_limiter(&self) -> &RateLimiter {
        &self.player_limiter
    }

    pub fn batch_limiter(&self) -> &RateLimiter {
        &self.batch_limiter
    }
}

impl Default for SmartPingRateLimiter {
    fn default() -> Self {
        Self::new(&ThrottleConfig::default())
    }
}
