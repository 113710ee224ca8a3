//! Token-bucket throttling of outbound upstream calls.
//!
//! The bucket holds a single token and regains it once per interval, so at
//! most one call proceeds per interval. Waiters are served in the order they
//! reserved their slot.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

use crate::error::{TaxError, TaxResult};

/// Allows one operation per configured interval, with a burst of one.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use taxcalc::rate_limit::RateLimiter;
///
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let limiter = RateLimiter::new(Duration::from_millis(5));
/// limiter.wait(std::future::pending()).await.unwrap();
/// limiter.wait(std::future::pending()).await.unwrap();
/// assert_eq!(limiter.wait_count(), 2);
/// # });
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    next_token: Mutex<Instant>,
    waits: AtomicU64,
}

impl RateLimiter {
    /// Creates a limiter whose bucket starts full.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_token: Mutex::new(Instant::now()),
            waits: AtomicU64::new(0),
        }
    }

    /// The replenishment interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Number of times [`RateLimiter::wait`] has been entered.
    pub fn wait_count(&self) -> u64 {
        self.waits.load(Ordering::Relaxed)
    }

    /// Waits until a token is available or `cancel` completes.
    ///
    /// Cancellation yields [`TaxError::RateLimit`]. A wait that ends early,
    /// by cancellation or by the future being dropped, hands its slot back
    /// if no later waiter has reserved behind it.
    pub async fn wait<C>(&self, cancel: C) -> TaxResult<()>
    where
        C: Future<Output = ()>,
    {
        self.waits.fetch_add(1, Ordering::Relaxed);

        let slot = {
            let mut next_token = self.next_token.lock();
            let now = Instant::now();
            let slot = (*next_token).max(now);
            *next_token = slot + self.interval;
            slot
        };

        let delay = slot.saturating_duration_since(Instant::now());
        if delay.is_zero() {
            return Ok(());
        }

        let mut reservation = Reservation {
            limiter: self,
            slot,
            used: false,
        };

        debug!(delay_ms = delay.as_millis() as u64, "waiting for rate limit");
        tokio::select! {
            biased;
            _ = cancel => Err(TaxError::RateLimit {
                message: "wait canceled".to_string(),
            }),
            _ = sleep_until(slot) => {
                reservation.used = true;
                Ok(())
            }
        }
    }
}

/// A future slot held by a pending wait.
struct Reservation<'a> {
    limiter: &'a RateLimiter,
    slot: Instant,
    used: bool,
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if self.used {
            return;
        }
        let mut next_token = self.limiter.next_token.lock();
        // Only the tail slot can be returned without moving later waiters.
        if *next_token == self.slot + self.limiter.interval {
            *next_token = self.slot;
            debug!("returned unused rate limit slot");
        }
    }
}
