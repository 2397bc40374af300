//! Retry policy with exponential backoff
//!
//! The policy is a plain value handed to the fetcher at construction, so the
//! backoff table can be asserted in tests without sleeping.

use super::FetcherError;
use std::time::Duration;

/// Maximum consecutive failed attempts on a single page before the
/// collection is aborted. Five attempts with exponential backoff allows
/// recovery from transient outages while bounding the worst-case wait.
pub const MAX_ATTEMPTS: u32 = 5;

/// Initial backoff delay in milliseconds.
/// 1 second is long enough for transient server hiccups to clear.
pub const INITIAL_BACKOFF_MS: u64 = 1000;

/// Maximum backoff delay in milliseconds.
/// Caps the exponential sequence (1s, 2s, 4s, 8s, 16s) should the attempt
/// ceiling ever be raised.
pub const MAX_BACKOFF_MS: u64 = 30_000;

/// Fixed wait applied to a rate-limit response before the backoff sequence
/// begins. Rate-limit windows reset on the order of a minute.
pub const RATE_LIMIT_FLOOR_MS: u64 = 60_000;

/// Calculate exponential backoff delay for a given step
pub fn calculate_backoff(step: u32) -> Duration {
    let delay_ms = INITIAL_BACKOFF_MS.saturating_mul(2u64.saturating_pow(step));
    Duration::from_millis(delay_ms.min(MAX_BACKOFF_MS))
}

/// Backoff strategy for transient page failures.
///
/// A 429 sleeps the fixed [`rate_limit_floor`](Self::rate_limit_floor) and
/// does not advance the backoff exponent; server errors and network failures
/// sleep the exponential sequence and advance it. The fetch loop owns the
/// counters and performs the actual sleeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Consecutive failed attempts on one page before aborting
    pub max_attempts: u32,
    /// First exponential backoff delay
    pub initial_backoff: Duration,
    /// Cap on any single backoff delay
    pub max_backoff: Duration,
    /// Fixed wait for a rate-limit response
    pub rate_limit_floor: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(MAX_BACKOFF_MS),
            rate_limit_floor: Duration::from_millis(RATE_LIMIT_FLOOR_MS),
        }
    }
}

impl RetryPolicy {
    /// Delay to apply before retrying after the given failure.
    ///
    /// `backoff_step` is the number of backoff-consuming failures already
    /// seen on this page (0 for the first).
    pub fn delay_for(&self, error: &FetcherError, backoff_step: u32) -> Duration {
        if matches!(error, FetcherError::RateLimited) {
            return self.rate_limit_floor;
        }
        let delay_ms = self
            .initial_backoff
            .as_millis()
            .saturating_mul(2u128.saturating_pow(backoff_step));
        Duration::from_millis(delay_ms.min(self.max_backoff.as_millis()) as u64)
    }

    /// Whether this failure advances the backoff exponent.
    ///
    /// Rate-limit responses are handled by the fixed floor and leave the
    /// exponential sequence untouched.
    pub fn advances_backoff(&self, error: &FetcherError) -> bool {
        !matches!(error, FetcherError::RateLimited)
    }
}
