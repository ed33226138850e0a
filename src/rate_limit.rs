//! Rate limit snapshots parsed from response headers.
//!
//! Every response from the API carries the caller's quota state in a small set of
//! `X-RateLimit-*` headers. [`RateLimit::from_headers`] turns them into a plain value
//! that the retry engine and callers can inspect.

use http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const USED_HEADER: &str = "x-ratelimit-used";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// Quota state reported by the server for a single response.
///
/// Missing or malformed headers leave the corresponding field at zero; there is no
/// distinction between "absent" and "zero" at this layer. Counters are signed so a
/// negative value from the server is kept as sent rather than read as zero.
///
/// The same shape is returned in JSON by the `/rate_limit` endpoint, which is why the
/// type is also (de)serializable.
///
/// # Examples
///
/// ```
/// use octocall::rate_limit::RateLimit;
/// use http::HeaderMap;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("x-ratelimit-limit", "5000".parse().unwrap());
/// headers.insert("x-ratelimit-remaining", "0".parse().unwrap());
///
/// let rate = RateLimit::from_headers(&headers);
/// assert_eq!(rate.limit, 5000);
/// assert!(rate.is_exhausted());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    /// Total requests allowed in the current window.
    #[serde(default)]
    pub limit: i64,

    /// Requests left in the current window.
    #[serde(default)]
    pub remaining: i64,

    /// Requests consumed in the current window, as reported by `X-RateLimit-Used`.
    #[serde(default)]
    pub used: i64,

    /// Unix epoch seconds at which the window resets. Zero when unknown.
    #[serde(default)]
    pub reset: i64,
}

impl RateLimit {
    /// Reads the four rate limit headers independently.
    ///
    /// This never fails: a header that is missing, not valid UTF-8 or not a decimal
    /// integer simply leaves its field at zero.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            limit: parse_header(headers, LIMIT_HEADER).unwrap_or_default(),
            remaining: parse_header(headers, REMAINING_HEADER).unwrap_or_default(),
            used: parse_header(headers, USED_HEADER).unwrap_or_default(),
            reset: parse_header(headers, RESET_HEADER).unwrap_or_default(),
        }
    }

    /// Returns `true` when no requests are left in the current window.
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Returns the reset instant, or `None` if the server did not report one.
    ///
    /// Any non-zero value counts as reported, including a negative one.
    pub fn reset_at(&self) -> Option<SystemTime> {
        match self.reset {
            0 => None,
            secs if secs > 0 => UNIX_EPOCH.checked_add(Duration::from_secs(secs.unsigned_abs())),
            secs => UNIX_EPOCH.checked_sub(Duration::from_secs(secs.unsigned_abs())),
        }
    }

    /// Time left until the window resets, measured from `now`.
    ///
    /// Returns `None` when no reset is known and `Some(Duration::ZERO)` when the reset
    /// instant is already behind `now`.
    pub fn until_reset(&self, now: SystemTime) -> Option<Duration> {
        if self.reset == 0 {
            return None;
        }
        let wait = self
            .reset_at()
            .and_then(|reset_at| reset_at.duration_since(now).ok())
            .unwrap_or(Duration::ZERO);
        Some(wait)
    }
}

fn parse_header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_from_headers_reads_all_fields() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("60"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("59"));
        headers.insert("x-ratelimit-used", HeaderValue::from_static("1"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("1717029203"));

        let rate = RateLimit::from_headers(&headers);
        assert_eq!(
            rate,
            RateLimit {
                limit: 60,
                remaining: 59,
                used: 1,
                reset: 1717029203,
            }
        );
    }

    #[test]
    fn test_from_headers_empty() {
        let rate = RateLimit::from_headers(&HeaderMap::new());
        assert_eq!(rate, RateLimit::default());
        assert!(rate.is_exhausted());
        assert_eq!(rate.reset_at(), None);
    }

    #[test]
    fn test_malformed_values_default_to_zero() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("abc"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("12"));
        headers.insert("x-ratelimit-used", HeaderValue::from_static("3.5"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("soon"));

        let rate = RateLimit::from_headers(&headers);
        assert_eq!(rate.limit, 0);
        assert_eq!(rate.remaining, 12);
        assert_eq!(rate.used, 0);
        assert_eq!(rate.reset, 0);
    }

    #[test]
    fn test_until_reset() {
        let now = UNIX_EPOCH + Duration::from_secs(1_000);

        let future = RateLimit {
            reset: 1_030,
            ..Default::default()
        };
        assert_eq!(future.until_reset(now), Some(Duration::from_secs(30)));

        let past = RateLimit {
            reset: 900,
            ..Default::default()
        };
        assert_eq!(past.until_reset(now), Some(Duration::ZERO));

        assert_eq!(RateLimit::default().until_reset(now), None);

        let negative = RateLimit {
            reset: -5,
            ..Default::default()
        };
        assert_eq!(negative.until_reset(now), Some(Duration::ZERO));
    }

    #[test]
    fn test_negative_values_are_kept() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("-1"));
        headers.insert("x-ratelimit-reset", HeaderValue::from_static("-5"));

        let rate = RateLimit::from_headers(&headers);
        assert_eq!(rate.remaining, -1);
        assert!(!rate.is_exhausted());
        assert_eq!(rate.reset, -5);
        assert!(rate.reset_at().is_some());
    }

    #[test]
    fn test_deserializes_from_api_json() {
        let rate: RateLimit =
            serde_json::from_str(r#"{"limit":5000,"remaining":4990,"used":10,"reset":1700000000}"#)
                .unwrap();
        assert_eq!(rate.remaining, 4990);
        assert_eq!(rate.reset, 1_700_000_000);
    }
}
