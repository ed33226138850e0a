//! Retry classification and backoff.
//!
//! This module decides whether a response qualifies for another attempt and how long
//! to wait before making it. Both pieces are pure: the executor in
//! [`Client`](crate::Client) owns the actual loop, the waiting and cancellation.

use crate::rate_limit::RateLimit;
use http::StatusCode;
use std::time::{Duration, SystemTime};

/// Default number of attempts (including the first one).
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Default base wait used by the exponential backoff.
pub const DEFAULT_MIN_WAIT: Duration = Duration::from_secs(5);

/// Default cap on the exponential backoff.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(60);

/// Wait applied when a reported reset instant has already passed.
const EXPIRED_RESET_WAIT: Duration = Duration::from_secs(1);

/// Why a response was deemed retryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    /// `403` or `429` with no quota left in the current window.
    RateLimited,
    /// `500`, `502` or `503`.
    ServerError,
}

impl std::fmt::Display for RetryReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetryReason::RateLimited => f.write_str("rate limited"),
            RetryReason::ServerError => f.write_str("server error"),
        }
    }
}

/// Classifies a response by status code and rate limit snapshot.
///
/// A `403`/`429` is only treated as rate limiting when `remaining` is zero; with quota
/// left it is a genuine client error (e.g. a permission denial) and is not retried.
///
/// # Examples
///
/// ```
/// use octocall::rate_limit::RateLimit;
/// use octocall::retry::{classify, RetryReason};
/// use http::StatusCode;
///
/// let exhausted = RateLimit::default();
/// assert_eq!(
///     classify(StatusCode::TOO_MANY_REQUESTS, &exhausted),
///     Some(RetryReason::RateLimited)
/// );
///
/// let quota_left = RateLimit { remaining: 5, ..Default::default() };
/// assert_eq!(classify(StatusCode::FORBIDDEN, &quota_left), None);
/// ```
pub fn classify(status: StatusCode, rate: &RateLimit) -> Option<RetryReason> {
    match status {
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS if rate.is_exhausted() => {
            Some(RetryReason::RateLimited)
        }
        StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE => Some(RetryReason::ServerError),
        _ => None,
    }
}

/// Returns `true` if a response with this status and rate limit should be retried.
pub fn should_retry(status: StatusCode, rate: &RateLimit) -> bool {
    classify(status, rate).is_some()
}

/// Computes the wait before the next attempt.
///
/// A known reset instant always wins over the exponential formula. Otherwise each
/// retry waits `min * 2^attempt`, capped at `max`.
///
/// # Examples
///
/// ```
/// use octocall::rate_limit::RateLimit;
/// use octocall::retry::Backoff;
/// use std::time::{Duration, SystemTime};
///
/// let backoff = Backoff::new(Duration::from_secs(1), Duration::from_secs(30));
/// let now = SystemTime::now();
/// let rate = RateLimit::default();
///
/// assert_eq!(backoff.delay(0, &rate, now), Duration::from_secs(1));
/// assert_eq!(backoff.delay(1, &rate, now), Duration::from_secs(2));
/// assert_eq!(backoff.delay(5, &rate, now), Duration::from_secs(30));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    min: Duration,
    max: Duration,
}

impl Backoff {
    /// Creates a backoff. Zero bounds are replaced by [`DEFAULT_MIN_WAIT`] and
    /// [`DEFAULT_MAX_WAIT`].
    pub fn new(min: Duration, max: Duration) -> Self {
        let min = if min.is_zero() { DEFAULT_MIN_WAIT } else { min };
        let max = if max.is_zero() { DEFAULT_MAX_WAIT } else { max };
        Self { min, max }
    }

    /// The base wait of the exponential formula.
    pub fn min(&self) -> Duration {
        self.min
    }

    /// The cap of the exponential formula.
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Returns the wait before the attempt following `attempt` (0-indexed).
    ///
    /// When `rate` reports a reset instant the wait is the time left until it, or one
    /// second if it has already passed. The reset-based wait is not capped by `max`.
    pub fn delay(&self, attempt: usize, rate: &RateLimit, now: SystemTime) -> Duration {
        match rate.until_reset(now) {
            Some(wait) if wait.is_zero() => EXPIRED_RESET_WAIT,
            Some(wait) => wait,
            None => self.exponential(attempt),
        }
    }

    fn exponential(&self, attempt: usize) -> Duration {
        u32::try_from(attempt)
            .ok()
            .and_then(|exp| 2u32.checked_pow(exp))
            .and_then(|factor| self.min.checked_mul(factor))
            .map_or(self.max, |wait| wait.min(self.max))
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_WAIT, DEFAULT_MAX_WAIT)
    }
}

/// Retry policy applied by the client to every request.
///
/// # Examples
///
/// ```
/// use octocall::retry::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::builder()
///     .max_attempts(3)
///     .min_wait(Duration::from_millis(250))
///     .max_wait(Duration::from_secs(10))
///     .build();
///
/// assert_eq!(config.max_attempts, 3);
/// assert!(config.rate_limit_retry);
/// ```
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts allowed, including the first. Values below one are treated as one.
    pub max_attempts: usize,

    /// Base wait of the exponential backoff. Zero means [`DEFAULT_MIN_WAIT`].
    pub min_wait: Duration,

    /// Cap of the exponential backoff. Zero means [`DEFAULT_MAX_WAIT`].
    pub max_wait: Duration,

    /// Whether retry-eligible responses are retried at all.
    ///
    /// When disabled, a rate limited or transient server error response is returned
    /// to the caller immediately as an [`ApiError`](crate::ApiError).
    pub rate_limit_retry: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            min_wait: DEFAULT_MIN_WAIT,
            max_wait: DEFAULT_MAX_WAIT,
            rate_limit_retry: true,
        }
    }
}

impl RetryConfig {
    /// Creates a new builder for the retry policy.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::default()
    }

    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self {
            rate_limit_retry: false,
            ..Default::default()
        }
    }

    /// The effective attempt budget.
    pub fn attempt_budget(&self) -> usize {
        self.max_attempts.max(1)
    }

    /// The backoff calculator for this policy.
    pub fn backoff(&self) -> Backoff {
        Backoff::new(self.min_wait, self.max_wait)
    }
}

/// Builder for [`RetryConfig`].
#[derive(Default)]
pub struct RetryConfigBuilder {
    max_attempts: Option<usize>,
    min_wait: Option<Duration>,
    max_wait: Option<Duration>,
    rate_limit_retry: Option<bool>,
}

impl RetryConfigBuilder {
    /// Sets the total number of attempts.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Sets the base wait of the exponential backoff.
    pub fn min_wait(mut self, wait: Duration) -> Self {
        self.min_wait = Some(wait);
        self
    }

    /// Sets the cap of the exponential backoff.
    pub fn max_wait(mut self, wait: Duration) -> Self {
        self.max_wait = Some(wait);
        self
    }

    /// Enables or disables retrying.
    pub fn rate_limit_retry(mut self, enabled: bool) -> Self {
        self.rate_limit_retry = Some(enabled);
        self
    }

    /// Builds the `RetryConfig`.
    pub fn build(self) -> RetryConfig {
        let default = RetryConfig::default();
        RetryConfig {
            max_attempts: self.max_attempts.unwrap_or(default.max_attempts),
            min_wait: self.min_wait.unwrap_or(default.min_wait),
            max_wait: self.max_wait.unwrap_or(default.max_wait),
            rate_limit_retry: self.rate_limit_retry.unwrap_or(default.rate_limit_retry),
        }
    }
}
