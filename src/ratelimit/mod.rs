//! Rate limiting for the crawl/extraction provider
//!
//! One `RateLimiter` is shared by every business pipeline in a discovery run.
//! It wraps a direct (unkeyed) `governor` limiter whose quota is a bucket of
//! `capacity` cells replenished one per refill interval. Time is read from the
//! tokio clock, so paused-time tests drive refills the same way they drive
//! sleeps.

use crate::config::RateLimitConfig;
use crate::ScoutError;
use governor::clock::Clock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::Quota;
use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Governor clock backed by `tokio::time::Instant`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        tokio::time::Instant::now().into_std()
    }
}

type DirectLimiter<C> =
    governor::RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Process-wide token bucket guarding provider calls
pub struct RateLimiter<C: Clock = TokioClock> {
    limiter: DirectLimiter<C>,
    clock: C,
}

impl RateLimiter {
    /// Creates a full limiter refilling one token per `refill_interval`
    pub fn new(capacity: u32, refill_interval: Duration) -> Self {
        Self::with_clock(capacity, refill_interval, TokioClock)
    }

    /// Creates a limiter from configuration
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.capacity,
            Duration::from_millis(config.refill_interval_ms),
        )
    }
}

impl<C: Clock> RateLimiter<C> {
    /// Creates a limiter reading time from `clock`
    ///
    /// A zero capacity or interval is raised to the smallest usable value;
    /// config validation rejects both before they get here.
    pub fn with_clock(capacity: u32, refill_interval: Duration, clock: C) -> Self {
        let burst = NonZeroU32::new(capacity).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(refill_interval.max(Duration::from_millis(1)))
            .unwrap_or_else(|| Quota::per_second(NonZeroU32::MIN))
            .allow_burst(burst);

        Self {
            limiter: governor::RateLimiter::direct_with_clock(quota, &clock),
            clock,
        }
    }

    /// Takes a token if one is available; never blocks
    pub fn allow(&self) -> bool {
        self.limiter.check().is_ok()
    }

    /// Waits for a token, sleeping until governor says the next one is due
    ///
    /// Gives up with `RateLimited` after `max_wait_attempts` waits, and with
    /// `Cancelled` as soon as `cancel` fires.
    pub async fn acquire(
        &self,
        service: &str,
        max_wait_attempts: u32,
        cancel: &CancellationToken,
    ) -> crate::Result<()> {
        let mut waits = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(ScoutError::Cancelled);
            }

            let not_until = match self.limiter.check() {
                Ok(()) => return Ok(()),
                Err(not_until) => not_until,
            };

            if waits >= max_wait_attempts {
                tracing::debug!(service, waits, "Gave up waiting for a rate limit token");
                return Err(ScoutError::rate_limited(service));
            }
            waits += 1;

            let wait = not_until.wait_time_from(self.clock.now());
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ScoutError::Cancelled),
                _ = tokio::time::sleep(wait) => {}
            }
        }
    }
}

impl<C: Clock> fmt::Debug for RateLimiter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}
