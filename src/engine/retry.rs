//! Retry policy for rate-limited fetches: bounded attempts, constant base delay with jitter.

use log::debug;
use rand::Rng;
use std::time::Duration;

use crate::engine::rate_limiter::RateLimiter;
use crate::error::FetchError;
use crate::pipeline::CancelToken;
use crate::utils::config::RetryConsts;

/// A value obtained after `retries` rate-limited attempts.
#[derive(Debug)]
pub struct Retried<T> {
    pub value: T,
    pub retries: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Base delay grows with the pool: `min(workers / 2 + 1, 5)` seconds.
    pub fn for_workers(workers: usize) -> Self {
        let secs = (workers as u64 / 2 + 1).min(RetryConsts::MAX_BASE_SECS);
        Self::new(RetryConsts::MAX_ATTEMPTS, Duration::from_secs(secs))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Base plus uniform jitter in `[0, base / 2]`. Drawn fresh on every call.
    pub fn next_delay(&self) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        let half = base_ms / 2;
        let jitter = if half > 0 {
            rand::thread_rng().gen_range(0..=half)
        } else {
            0
        };
        Duration::from_millis(base_ms + jitter)
    }

    /// Run `attempt` until it succeeds, fails with a non-rate-limit error, the attempt
    /// ceiling is hit, or `cancel` fires. The limiter is consulted before every attempt and
    /// a refusal counts as a rate-limited failure.
    pub fn run<T, F>(
        &self,
        limiter: &RateLimiter,
        cancel: &CancelToken,
        mut attempt: F,
    ) -> Result<Retried<T>, FetchError>
    where
        F: FnMut() -> Result<T, FetchError>,
    {
        let mut attempts = 0_u32;
        loop {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            attempts += 1;
            let result = if limiter.allow() {
                attempt()
            } else {
                Err(FetchError::RateLimited("local limiter refused".to_string()))
            };
            match result {
                Ok(value) => {
                    return Ok(Retried {
                        value,
                        retries: attempts - 1,
                    });
                }
                Err(e) if e.is_rate_limited() => {
                    if attempts >= self.max_attempts {
                        return Err(FetchError::RetryExhausted {
                            attempts,
                            last: Box::new(e),
                        });
                    }
                    let delay = self.next_delay();
                    debug!(
                        "attempt {}/{} rate limited, retrying in {:?}",
                        attempts, self.max_attempts, delay
                    );
                    if !cancel.sleep(delay) {
                        return Err(FetchError::Cancelled);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}
