//! Page fetching with exponential backoff.
//!
//! [`FetchPage`] is the seam between paging logic and HTTP. [`RetryFetch`]
//! wraps any fetcher and retries transient failures (transport errors,
//! HTTP 429 and 5xx) with:
//!
//! ```text
//! delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..=max_jitter)
//! ```
//!
//! Permanent failures such as a bad credential are returned immediately.

use crate::error::CollectError;
use crate::models::NaverSearchResponse;
use rand::{rng, Rng};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, instrument, warn};

/// Something that can fetch one page of search results by its start index.
pub trait FetchPage {
    async fn fetch_page(&self, start: u32) -> Result<NaverSearchResponse, CollectError>;
}

/// Retry decorator for a [`FetchPage`] implementation.
pub struct RetryFetch<T> {
    inner: T,
    /// Retries after the first attempt.
    max_retries: usize,
    /// Delay before the first retry; doubles with each attempt.
    base_delay: Duration,
    max_delay: Duration,
    max_jitter: Duration,
}

impl<T: FetchPage> RetryFetch<T> {
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
            max_jitter: Duration::from_millis(250),
        }
    }

    pub fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    fn backoff(&self, attempt: usize) -> Duration {
        let shift = (attempt.saturating_sub(1)).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=self.max_jitter.as_millis() as u64);
        delay + Duration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T: FetchPage> FetchPage for RetryFetch<T> {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_page(&self, start: u32) -> Result<NaverSearchResponse, CollectError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            let err = match self.inner.fetch_page(start).await {
                Ok(page) => return Ok(page),
                Err(e) => e,
            };
            attempt += 1;

            if !err.is_transient() || attempt > self.max_retries {
                error!(
                    start,
                    attempt,
                    max = self.max_retries,
                    elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                    error = %err,
                    "fetch_page() giving up"
                );
                return Err(err);
            }

            let delay = self.backoff(attempt);
            warn!(
                start,
                attempt,
                max = self.max_retries,
                elapsed_ms_attempt = attempt_t0.elapsed().as_millis() as u64,
                ?delay,
                error = %err,
                "fetch_page() attempt failed; backing off"
            );
            sleep(delay).await;
        }
    }
}
