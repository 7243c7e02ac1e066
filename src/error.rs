//! Per-vault fetch errors. Only catalog failures are fatal to a run; everything here is
//! recorded against a single vault.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream returned 429 or the local limiter refused the request.
    #[error("429: rate limited ({0})")]
    RateLimited(String),

    /// Network error, non-success status, or malformed payload.
    #[error("upstream failure: {0}")]
    Upstream(String),

    #[error("still rate limited after {attempts} attempts: {last}")]
    RetryExhausted {
        attempts: u32,
        last: Box<FetchError>,
    },

    #[error("cancelled before completion")]
    Cancelled,

    /// Worker thread exited without reporting this vault.
    #[error("worker exited without reporting")]
    WorkerLost,
}

impl FetchError {
    /// The only error kind the retry policy retries.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(reqwest::StatusCode::TOO_MANY_REQUESTS) => FetchError::RateLimited(e.to_string()),
            _ => FetchError::Upstream(e.to_string()),
        }
    }
}
