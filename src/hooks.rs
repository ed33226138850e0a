//! Extension points of the request executor.
//!
//! [`RequestObserver`] receives every attempt before it is sent and every envelope
//! after it arrives. [`RateLimitHandler`] replaces the built-in backoff wait with the
//! caller's own pacing.

use crate::error::BoxError;
use crate::Response;
use async_trait::async_trait;

/// Observes requests and responses as the executor makes them.
///
/// Both methods are called synchronously on the task running the request, in send
/// order, once per attempt. They cannot fail and cannot influence retrying, so they
/// must return quickly; hand anything slow off to another task.
///
/// # Examples
///
/// ```
/// use octocall::{RequestObserver, Response};
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// #[derive(Default)]
/// struct CountRequests(AtomicUsize);
///
/// impl RequestObserver for CountRequests {
///     fn on_request(&self, _request: &reqwest::Request, _attempt: usize) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait RequestObserver: Send + Sync {
    /// Called right before an attempt is sent. `attempt` is 0-indexed.
    fn on_request(&self, request: &reqwest::Request, attempt: usize) {
        let _ = (request, attempt);
    }

    /// Called once the status and headers of an attempt have arrived.
    fn on_response(&self, response: &Response, attempt: usize) {
        let _ = (response, attempt);
    }
}

/// Custom pacing for retry-eligible responses.
///
/// When configured, the handler runs instead of the default backoff wait. Returning
/// `Ok(())` means "ready to try again" and the next attempt starts immediately;
/// returning an error ends the call with
/// [`Error::RateLimitHandler`](crate::Error::RateLimitHandler).
///
/// The handler is also called for the last permitted attempt. After it returns `Ok(())`
/// the call ends with an [`Error::Api`](crate::Error::Api) built from that response,
/// rather than [`Error::MaxAttemptsExceeded`](crate::Error::MaxAttemptsExceeded).
///
/// This is the place to plug in a coordinator shared by many clients, such as a
/// token bucket.
///
/// # Examples
///
/// ```
/// use octocall::{BoxError, RateLimitHandler, Response};
/// use std::time::Duration;
///
/// struct FixedPause(Duration);
///
/// #[async_trait::async_trait]
/// impl RateLimitHandler for FixedPause {
///     async fn handle(&self, _response: &Response) -> Result<(), BoxError> {
///         tokio::time::sleep(self.0).await;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait RateLimitHandler: Send + Sync {
    /// Waits until another attempt may be made, or refuses with an error.
    async fn handle(&self, response: &Response) -> Result<(), BoxError>;
}
