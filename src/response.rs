//! The response envelope.
//!
//! A [`Response`] is built once per HTTP round trip, as soon as status and headers are
//! available. It carries the rate limit snapshot and pagination parsed from those
//! headers, and, once decoding succeeds, the typed payload. The payload-less
//! `Response<()>` is what errors carry, so rate limit and pagination data survive a
//! failed call.

use crate::pagination::Pagination;
use crate::rate_limit::RateLimit;
use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// An API response: typed payload plus the metadata of the HTTP exchange.
///
/// # Examples
///
/// ```no_run
/// use octocall::Client;
///
/// # async fn example() -> Result<(), octocall::Error> {
/// let client = Client::builder().token("ghp_example").build()?;
///
/// let repos = client.repositories().list_for_user("rust-lang", &Default::default()).await?;
///
/// println!("{} repos on this page", repos.data.len());
/// println!("{} requests left until {}", repos.rate.remaining, repos.rate.reset);
/// if repos.pages.has_next() {
///     println!("next page: {}", repos.pages.next);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T = ()> {
    /// The deserialized payload; `()` for calls without a decode target.
    pub data: T,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Rate limit snapshot taken from this response's headers.
    pub rate: RateLimit,

    /// Neighbouring pages advertised by the `Link` header.
    pub pages: Pagination,

    /// Time from the first send until this response's headers arrived, including
    /// any retries.
    pub latency: Duration,

    /// The number of attempts made to obtain this response.
    pub attempts: usize,
}

impl Response {
    /// Builds the envelope for a received status line and header set.
    ///
    /// Construction never fails. Missing rate limit headers leave [`Response::rate`]
    /// zeroed, and a missing `Link` header leaves [`Response::pages`] zeroed. A `Link`
    /// header that is present but malformed is logged and ignored.
    pub fn from_parts(
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
        attempts: usize,
    ) -> Self {
        let rate = RateLimit::from_headers(&headers);
        let pages = link_pages(&headers);

        Self {
            data: (),
            status,
            headers,
            rate,
            pages,
            latency,
            attempts,
        }
    }

    /// Attaches a decoded payload to this envelope.
    pub fn with_data<T>(self, data: T) -> Response<T> {
        self.map(|()| data)
    }
}

impl<T> Response<T> {
    /// Maps the payload to a different type, keeping the metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// # use octocall::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::from_parts(StatusCode::OK, HeaderMap::new(), Duration::ZERO, 1)
    ///     .with_data(vec![1, 2, 3]);
    ///
    /// let count = response.map(|items| items.len());
    /// assert_eq!(count.data, 3);
    /// ```
    pub fn map<U, F>(self, f: F) -> Response<U>
    where
        F: FnOnce(T) -> U,
    {
        Response {
            data: f(self.data),
            status: self.status,
            headers: self.headers,
            rate: self.rate,
            pages: self.pages,
            latency: self.latency,
            attempts: self.attempts,
        }
    }

    /// Splits the payload from its envelope.
    pub fn into_parts(self) -> (T, Response) {
        let Response {
            data,
            status,
            headers,
            rate,
            pages,
            latency,
            attempts,
        } = self;
        let envelope = Response {
            data: (),
            status,
            headers,
            rate,
            pages,
            latency,
            attempts,
        };
        (data, envelope)
    }

    /// Returns `true` if the request required retries.
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a header value by name, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

fn link_pages(headers: &HeaderMap) -> Pagination {
    let Some(link) = headers.get(http::header::LINK).and_then(|v| v.to_str().ok()) else {
        return Pagination::default();
    };

    match Pagination::from_link_header(link) {
        Ok(pages) => pages,
        Err(e) => {
            tracing::warn!(error = %e, link = %link, "Ignoring malformed Link header");
            Pagination::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_from_parts_without_headers_is_zeroed() {
        let response = Response::from_parts(
            StatusCode::NO_CONTENT,
            HeaderMap::new(),
            Duration::from_millis(5),
            1,
        );
        assert_eq!(response.rate, RateLimit::default());
        assert_eq!(response.pages, Pagination::default());
        assert!(!response.was_retried());
    }

    #[test]
    fn test_from_parts_reads_rate_and_links() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("41"));
        headers.insert(
            "link",
            HeaderValue::from_static(r#"<https://api.github.com/users?page=3>; rel="next""#),
        );

        let response = Response::from_parts(StatusCode::OK, headers, Duration::ZERO, 2);
        assert_eq!(response.rate.remaining, 41);
        assert_eq!(response.pages.next, 3);
        assert!(response.was_retried());
        assert_eq!(
            response.header("link"),
            Some(r#"<https://api.github.com/users?page=3>; rel="next""#)
        );
    }

    #[test]
    fn test_malformed_link_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "link",
            HeaderValue::from_static(r#"<https://api.github.com/users?page=x>; rel="next""#),
        );
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("60"));

        let response = Response::from_parts(StatusCode::OK, headers, Duration::ZERO, 1);
        assert_eq!(response.pages, Pagination::default());
        assert_eq!(response.rate.limit, 60);
    }

    #[test]
    fn test_into_parts() {
        let response = Response::from_parts(StatusCode::OK, HeaderMap::new(), Duration::ZERO, 1)
            .with_data("payload");
        let (data, envelope) = response.into_parts();
        assert_eq!(data, "payload");
        assert_eq!(envelope.status, StatusCode::OK);
    }
}
