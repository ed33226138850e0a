//! Error types for API calls.
//!
//! Failures come in a few distinct shapes, and callers are expected to tell them
//! apart:
//!
//! - transport failures ([`Error::Network`], [`Error::Timeout`]) carry no response;
//! - a failing status code becomes a structured [`ApiError`] ([`Error::Api`]);
//! - running out of attempts is [`Error::MaxAttemptsExceeded`], not an `ApiError`;
//! - a successful status whose body does not decode is [`Error::DeserializationFailed`];
//! - [`Error::Cancelled`] means the client's cancellation token fired.
//!
//! Every variant that was produced after a response arrived carries that response's
//! envelope, reachable through [`Error::response`].

use crate::Response;
use http::StatusCode;
use serde::Deserialize;

/// Boxed error returned by a custom [`RateLimitHandler`](crate::RateLimitHandler).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for API calls.
///
/// # Examples
///
/// ```no_run
/// use octocall::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder().build()?;
///
/// match client.users().get("octocat").await {
///     Ok(user) => println!("{} has {} followers", user.data.login, user.data.followers),
///     Err(Error::Api(api)) if api.status_code == 404 => eprintln!("no such user"),
///     Err(Error::MaxAttemptsExceeded { attempts, response }) => {
///         eprintln!("gave up after {} attempts, resets at {}", attempts, response.rate.reset);
///     }
///     Err(e) => eprintln!("request failed: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection failed, DNS lookup failed, etc.).
    ///
    /// Transport failures are never retried and carry no response.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The server answered with a failing status code.
    #[error(transparent)]
    Api(Box<ApiError>),

    /// Every permitted attempt came back retry-eligible.
    ///
    /// `response` is the envelope of the last attempt.
    #[error("Max attempts exceeded after {attempts} attempts (last status {})", .response.status)]
    MaxAttemptsExceeded {
        /// The number of attempts made
        attempts: usize,
        /// Envelope of the last response received
        response: Box<Response>,
    },

    /// The custom rate limit handler refused to continue.
    #[error("Rate limit handler failed: {source}")]
    RateLimitHandler {
        /// The handler's error
        source: BoxError,
        /// Envelope of the response that triggered the handler
        response: Box<Response>,
    },

    /// Failed to deserialize a successful response body into the expected type.
    ///
    /// This error preserves both the raw response text and the serde error message.
    #[error("Failed to deserialize response (status {}): {serde_error}", .response.status)]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// Envelope of the response
        response: Box<Response>,
    },

    /// The call was cancelled through the client's cancellation token.
    #[error("Request cancelled")]
    Cancelled,

    /// Invalid configuration was provided.
    ///
    /// This indicates a problem with how the client or request was configured,
    /// such as invalid header values.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Failed to serialize the request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Maps a transport error, separating timeouts from other network failures.
    pub(crate) fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(error)
        }
    }

    /// Returns the envelope of the response this error was produced from, if any.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Error::Api(api) => Some(&api.response),
            Error::MaxAttemptsExceeded { response, .. } => Some(&**response),
            Error::RateLimitHandler { response, .. } => Some(&**response),
            Error::DeserializationFailed { response, .. } => Some(&**response),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this error has a response.
    pub fn status(&self) -> Option<StatusCode> {
        self.response().map(|r| r.status)
    }

    /// Returns the structured API error, if this is one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(api) => Some(&**api),
            _ => None,
        }
    }

    /// Returns `true` if the last response reported an exhausted quota with a
    /// `403` or `429` status.
    pub fn is_rate_limited(&self) -> bool {
        self.response().is_some_and(|r| {
            matches!(
                r.status,
                StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
            ) && r.rate.is_exhausted()
        })
    }

    /// Returns `true` if the call was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

impl From<ApiError> for Error {
    fn from(error: ApiError) -> Self {
        Error::Api(Box::new(error))
    }
}

/// A single entry of the `errors` array in an API error body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code, e.g. `missing_field`.
    #[serde(default)]
    pub code: String,
    /// The resource the error refers to.
    #[serde(default)]
    pub resource: String,
    /// The field the error refers to.
    #[serde(default)]
    pub field: String,
}

/// A structured failure reported by the API.
///
/// Built from any response with a status of 400 or above. When the body is not a JSON
/// object, `message` is `"request failed with status <code>"`. An object without a
/// `message` field keeps its other fields and leaves `message` empty.
#[derive(thiserror::Error, Debug, Clone)]
#[error("API error {status_code}: {message}")]
pub struct ApiError {
    /// Human-readable message from the body.
    pub message: String,
    /// Link to the relevant API documentation, when provided.
    pub documentation_url: Option<String>,
    /// The HTTP status code.
    pub status_code: u16,
    /// Detailed validation errors, possibly empty.
    pub errors: Vec<ErrorDetail>,
    /// Envelope of the failing response.
    pub response: Response,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    documentation_url: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorDetail>,
}

impl ApiError {
    /// Builds an `ApiError` from a failing response's envelope and raw body.
    ///
    /// # Examples
    ///
    /// ```
    /// use octocall::{ApiError, Response};
    /// use http::{HeaderMap, StatusCode};
    /// use std::time::Duration;
    ///
    /// let envelope = Response::from_parts(StatusCode::NOT_FOUND, HeaderMap::new(), Duration::ZERO, 1);
    ///
    /// let err = ApiError::from_body(envelope.clone(), r#"{"message":"Not Found"}"#);
    /// assert_eq!(err.message, "Not Found");
    ///
    /// let err = ApiError::from_body(envelope, "<html>oops</html>");
    /// assert_eq!(err.message, "request failed with status 404");
    /// ```
    pub fn from_body(response: Response, body: &str) -> Self {
        let status_code = response.status.as_u16();

        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => Self {
                message: parsed.message,
                documentation_url: parsed.documentation_url,
                status_code,
                errors: parsed.errors,
                response,
            },
            Err(_) => Self {
                message: format!("request failed with status {}", status_code),
                documentation_url: None,
                status_code,
                errors: Vec::new(),
                response,
            },
        }
    }
}

/// A specialized `Result` type for API calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, HeaderValue};
    use std::time::Duration;

    fn envelope(status: StatusCode) -> Response {
        Response::from_parts(status, HeaderMap::new(), Duration::ZERO, 1)
    }

    #[test]
    fn test_api_error_with_all_fields() {
        let body = r#"{
            "message": "Unauthorized access",
            "documentation_url": "https://example.com/docs",
            "errors": [{"code": "401", "resource": "auth", "field": "token"}]
        }"#;

        let err = ApiError::from_body(envelope(StatusCode::UNAUTHORIZED), body);
        assert_eq!(err.message, "Unauthorized access");
        assert_eq!(err.documentation_url.as_deref(), Some("https://example.com/docs"));
        assert_eq!(err.status_code, 401);
        assert_eq!(
            err.errors,
            vec![ErrorDetail {
                code: "401".to_string(),
                resource: "auth".to_string(),
                field: "token".to_string(),
            }]
        );
        assert_eq!(err.to_string(), "API error 401: Unauthorized access");
    }

    #[test]
    fn test_api_error_message_only() {
        let err = ApiError::from_body(envelope(StatusCode::CONFLICT), r#"{"message":"Conflict detected","errors":[]}"#);
        assert_eq!(err.message, "Conflict detected");
        assert!(err.documentation_url.is_none());
        assert!(err.errors.is_empty());
    }

    #[test]
    fn test_api_error_fallback_message() {
        for (status, body) in [
            (StatusCode::NOT_FOUND, "Not Found"),
            (StatusCode::BAD_REQUEST, "invalid-json"),
            (StatusCode::INTERNAL_SERVER_ERROR, ""),
        ] {
            let err = ApiError::from_body(envelope(status), body);
            assert_eq!(
                err.message,
                format!("request failed with status {}", status.as_u16())
            );
            assert!(err.errors.is_empty());
        }
    }

    #[test]
    fn test_api_error_without_message_keeps_details() {
        let body = r#"{"errors":[{"code":"invalid","resource":"Label","field":"color"}]}"#;
        let err = ApiError::from_body(envelope(StatusCode::UNPROCESSABLE_ENTITY), body);
        assert_eq!(err.message, "");
        assert_eq!(err.status_code, 422);
        assert_eq!(
            err.errors,
            vec![ErrorDetail {
                code: "invalid".to_string(),
                resource: "Label".to_string(),
                field: "color".to_string(),
            }]
        );

        let err = ApiError::from_body(envelope(StatusCode::FORBIDDEN), "{}");
        assert_eq!(err.message, "");
        assert!(err.errors.is_empty());
    }

    #[test]
    fn test_error_accessors() {
        let mut headers = HeaderMap::new();
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        let limited = Response::from_parts(StatusCode::TOO_MANY_REQUESTS, headers, Duration::ZERO, 3);

        let err = Error::MaxAttemptsExceeded {
            attempts: 3,
            response: Box::new(limited.clone()),
        };
        assert_eq!(err.status(), Some(StatusCode::TOO_MANY_REQUESTS));
        assert!(err.is_rate_limited());
        assert!(err.api_error().is_none());

        let err: Error = ApiError::from_body(envelope(StatusCode::FORBIDDEN), "{}").into();
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert!(err.api_error().is_some());

        assert!(Error::Cancelled.is_cancelled());
        assert!(Error::Cancelled.response().is_none());
        assert!(Error::Timeout.status().is_none());
    }
}
