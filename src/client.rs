//! HTTP client with rate-limit aware retries.
//!
//! The [`Client`] type is the main entry point. Use [`ClientBuilder`] to configure
//! and create clients, and the resource accessors ([`Client::users`],
//! [`Client::issues`], ...) for typed endpoints.

use crate::{
    api::{IssuesApi, PullsApi, RateLimitApi, RepositoriesApi, SearchApi, UsersApi},
    hooks::{RateLimitHandler, RequestObserver},
    metadata::RequestMetadata,
    retry::{self, RetryConfig},
    ApiError, Error, Response, Result,
};
use http::{header, HeaderMap, HeaderName, HeaderValue, Method};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio_util::sync::CancellationToken;
use url::Url;

/// The public GitHub API.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com/";

const MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";
const DEFAULT_USER_AGENT: &str = concat!("octocall/", env!("CARGO_PKG_VERSION"));

/// A GitHub API client.
///
/// The client is cheap to clone and designed to be shared: clones use the same
/// connection pool and configuration, which is immutable after
/// [`ClientBuilder::build`].
///
/// # Examples
///
/// ```no_run
/// use octocall::{Client, retry::RetryConfig};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), octocall::Error> {
/// let client = Client::builder()
///     .token("ghp_example")
///     .timeout(Duration::from_secs(30))
///     .retry_config(RetryConfig::builder().max_attempts(5).build())
///     .build()?;
///
/// let user = client.users().get("octocat").await?;
/// println!("{} ({} requests left)", user.data.login, user.rate.remaining);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
    cancel: CancellationToken,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
    retry_config: RetryConfig,
    rate_limit_handler: Option<Arc<dyn RateLimitHandler>>,
    observer: Option<Arc<dyn RequestObserver>>,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Returns a handle whose calls all observe `token`.
    ///
    /// Cancelling the token aborts an in-flight call at its next checkpoint: before
    /// each attempt, while a request is in flight, and while waiting between
    /// attempts. The aborted call returns [`Error::Cancelled`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use octocall::Client;
    /// use tokio_util::sync::CancellationToken;
    ///
    /// # async fn example() -> Result<(), octocall::Error> {
    /// let client = Client::builder().build()?;
    /// let token = CancellationToken::new();
    ///
    /// let scoped = client.with_cancellation(token.child_token());
    /// tokio::spawn(async move { scoped.users().get("octocat").await });
    ///
    /// token.cancel();
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_cancellation(&self, token: CancellationToken) -> Client {
        Client {
            inner: Arc::clone(&self.inner),
            cancel: token,
        }
    }

    /// The cancellation token observed by this handle.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// The base URL paths are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The retry policy of this client.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.inner.retry_config
    }

    /// Users endpoints.
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(self)
    }

    /// Repositories endpoints.
    pub fn repositories(&self) -> RepositoriesApi<'_> {
        RepositoriesApi::new(self)
    }

    /// Issues endpoints.
    pub fn issues(&self) -> IssuesApi<'_> {
        IssuesApi::new(self)
    }

    /// Pull request endpoints.
    pub fn pulls(&self) -> PullsApi<'_> {
        PullsApi::new(self)
    }

    /// Search endpoints.
    pub fn search(&self) -> SearchApi<'_> {
        SearchApi::new(self)
    }

    /// Rate limit status endpoint.
    pub fn rate_limit(&self) -> RateLimitApi<'_> {
        RateLimitApi::new(self)
    }

    /// Builds a request ready for [`Client::execute`].
    ///
    /// The path is resolved against the base URL and query parameters are appended
    /// in order. The client's default headers (media type, API version, user agent
    /// and authorization) are applied before the per-request ones. A body is sent
    /// as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the path does not form a valid URL or the body cannot be
    /// serialized.
    pub fn build_request<B>(
        &self,
        metadata: &RequestMetadata,
        body: Option<&B>,
    ) -> Result<reqwest::Request>
    where
        B: Serialize + ?Sized,
    {
        let mut url = self
            .inner
            .base_url
            .join(metadata.path.trim_start_matches('/'))?;

        if !metadata.query_params.is_empty() {
            url.query_pairs_mut().extend_pairs(&metadata.query_params);
        }

        let mut request = self.inner.http_client.request(metadata.method.clone(), url);

        for (name, value) in &self.inner.default_headers {
            request = request.header(name, value);
        }

        for (name, value) in &metadata.headers {
            request = request.header(name, value);
        }

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        if let Some(body) = body {
            let json =
                serde_json::to_vec(body).map_err(|e| Error::SerializationFailed(e.to_string()))?;
            request = request
                .header(header::CONTENT_TYPE, "application/json")
                .body(json);
        }

        request
            .build()
            .map_err(|e| Error::ConfigurationError(format!("Failed to build request: {}", e)))
    }

    /// Executes a request and decodes the JSON body into `T`.
    ///
    /// This runs the full retry cycle: each attempt is sent, its rate limit headers
    /// are read and the response is classified. Rate limited (`403`/`429` with no
    /// quota left) and transient server errors (`500`, `502`, `503`) are retried
    /// after a backoff, or after the custom [`RateLimitHandler`], until the attempt
    /// budget runs out.
    ///
    /// # Errors
    ///
    /// - [`Error::Network`] / [`Error::Timeout`]: transport failure, never retried.
    /// - [`Error::Api`]: a final status of 400 or above, or a retry-eligible status
    ///   with retrying disabled.
    /// - [`Error::MaxAttemptsExceeded`]: every attempt was retry-eligible and no rate
    ///   limit handler is configured.
    /// - [`Error::RateLimitHandler`]: the custom handler failed.
    /// - [`Error::DeserializationFailed`]: a successful body did not decode into `T`.
    /// - [`Error::Cancelled`]: the cancellation token fired.
    pub async fn execute<T>(&self, request: reqwest::Request) -> Result<Response<T>>
    where
        T: DeserializeOwned,
    {
        let (http_response, envelope) = self.dispatch(request).await?;

        let raw_body = self
            .cancellable(http_response.text())
            .await?
            .map_err(Error::from_transport)?;

        match serde_json::from_str::<T>(&raw_body) {
            Ok(data) => Ok(envelope.with_data(data)),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    status = envelope.status.as_u16(),
                    raw_response = %raw_body,
                    "Failed to deserialize response"
                );

                Err(Error::DeserializationFailed {
                    raw_response: raw_body,
                    serde_error: e.to_string(),
                    response: Box::new(envelope),
                })
            }
        }
    }

    /// Executes a request without decoding the body.
    ///
    /// Identical to [`Client::execute`] except that a successful body is discarded,
    /// for endpoints that answer `204 No Content` or whose payload is irrelevant.
    pub async fn execute_empty(&self, request: reqwest::Request) -> Result<Response> {
        let (_, envelope) = self.dispatch(request).await?;
        Ok(envelope)
    }

    /// Runs the attempt loop. On success returns the final response, body unread,
    /// together with its envelope.
    async fn dispatch(&self, request: reqwest::Request) -> Result<(reqwest::Response, Response)> {
        let retry_config = &self.inner.retry_config;
        let max_attempts = retry_config.attempt_budget();
        let backoff = retry_config.backoff();
        let start_time = Instant::now();
        let mut attempt = 0;

        loop {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let attempt_request = request.try_clone().ok_or_else(|| {
                Error::ConfigurationError("Request body cannot be replayed".to_string())
            })?;

            if let Some(observer) = &self.inner.observer {
                observer.on_request(&attempt_request, attempt);
            }

            tracing::debug!(
                method = %request.method(),
                url = %request.url(),
                attempt = attempt + 1,
                max_attempts = max_attempts,
                "Executing HTTP request"
            );

            let http_response = self
                .cancellable(self.inner.http_client.execute(attempt_request))
                .await?
                .map_err(Error::from_transport)?;

            let envelope = Response::from_parts(
                http_response.status(),
                http_response.headers().clone(),
                start_time.elapsed(),
                attempt + 1,
            );

            tracing::info!(
                status = envelope.status.as_u16(),
                remaining = envelope.rate.remaining,
                latency_ms = envelope.latency.as_millis() as u64,
                attempt = attempt + 1,
                "Received HTTP response"
            );

            if let Some(observer) = &self.inner.observer {
                observer.on_response(&envelope, attempt);
            }

            let Some(reason) = retry::classify(envelope.status, &envelope.rate) else {
                if envelope.status.as_u16() >= 400 {
                    return Err(self.api_error(http_response, envelope).await);
                }
                return Ok((http_response, envelope));
            };

            tracing::warn!(
                status = envelope.status.as_u16(),
                reason = %reason,
                attempt = attempt + 1,
                "Retry-eligible response"
            );

            if !retry_config.rate_limit_retry {
                return Err(self.api_error(http_response, envelope).await);
            }

            let last_attempt = attempt + 1 >= max_attempts;

            if let Some(handler) = &self.inner.rate_limit_handler {
                // The handler sees every retry-eligible response, the last one included.
                let final_error = if last_attempt {
                    Some(self.api_error(http_response, envelope.clone()).await)
                } else {
                    drop(http_response);
                    None
                };

                let handled = self.cancellable(handler.handle(&envelope)).await?;
                if let Err(source) = handled {
                    return Err(Error::RateLimitHandler {
                        source,
                        response: Box::new(envelope),
                    });
                }
                if let Some(error) = final_error {
                    return Err(error);
                }
            } else {
                // The body of a retried response is never read.
                drop(http_response);

                if last_attempt {
                    return Err(Error::MaxAttemptsExceeded {
                        attempts: attempt + 1,
                        response: Box::new(envelope),
                    });
                }

                let delay = backoff.delay(attempt, &envelope.rate, SystemTime::now());
                tracing::info!(
                    delay_ms = delay.as_millis() as u64,
                    attempt = attempt + 1,
                    reason = %reason,
                    reset = envelope.rate.reset,
                    "Waiting before retry"
                );
                self.cancellable(tokio::time::sleep(delay)).await?;
            }

            attempt += 1;
        }
    }

    /// Races `future` against this handle's cancellation token.
    async fn cancellable<F: Future>(&self, future: F) -> Result<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            output = future => Ok(output),
        }
    }

    /// Reads a failing response's body into an [`ApiError`].
    ///
    /// A body that cannot be read is treated as empty. Cancellation while reading
    /// yields [`Error::Cancelled`] instead.
    async fn api_error(&self, http_response: reqwest::Response, envelope: Response) -> Error {
        let status = envelope.status;
        let raw_response = match self.cancellable(http_response.text()).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                tracing::warn!(
                    status = status.as_u16(),
                    error = %e,
                    "Failed to read error response body"
                );
                String::new()
            }
            Err(cancelled) => return cancelled,
        };

        if status.is_client_error() {
            tracing::error!(
                status = status.as_u16(),
                response = %raw_response,
                "Client error (4xx)"
            );
        } else if status.is_server_error() {
            tracing::warn!(
                status = status.as_u16(),
                response = %raw_response,
                "Server error (5xx)"
            );
        }

        ApiError::from_body(envelope, &raw_response).into()
    }

    /// Builds and executes a request, decoding the response into `Res`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use octocall::{Client, metadata::RequestMetadata};
    /// use http::Method;
    ///
    /// # async fn example() -> Result<(), octocall::Error> {
    /// let client = Client::builder().build()?;
    ///
    /// let metadata = RequestMetadata::new(Method::GET, "orgs/rust-lang/repos")
    ///     .with_query_param("per_page", "10");
    ///
    /// let repos = client.call::<(), serde_json::Value>(metadata, None).await?;
    /// println!("{}", repos.data);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call<Req, Res>(
        &self,
        metadata: RequestMetadata,
        body: Option<&Req>,
    ) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let request = self.build_request(&metadata, body)?;
        self.execute(request).await
    }

    /// Builds and executes a request, discarding a successful body.
    pub async fn call_empty<Req>(
        &self,
        metadata: RequestMetadata,
        body: Option<&Req>,
    ) -> Result<Response>
    where
        Req: Serialize + ?Sized,
    {
        let request = self.build_request(&metadata, body)?;
        self.execute_empty(request).await
    }

    /// Makes a GET request to the specified path.
    pub async fn get<Res>(&self, path: impl Into<String>) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        let metadata = RequestMetadata::new(Method::GET, path);
        self.call::<(), Res>(metadata, None).await
    }

    /// Makes a POST request to the specified path with a JSON body.
    pub async fn post<Req, Res>(&self, path: impl Into<String>, body: &Req) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let metadata = RequestMetadata::new(Method::POST, path);
        self.call(metadata, Some(body)).await
    }

    /// Makes a PUT request to the specified path with a JSON body.
    pub async fn put<Req, Res>(&self, path: impl Into<String>, body: &Req) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let metadata = RequestMetadata::new(Method::PUT, path);
        self.call(metadata, Some(body)).await
    }

    /// Makes a PATCH request to the specified path with a JSON body.
    pub async fn patch<Req, Res>(
        &self,
        path: impl Into<String>,
        body: &Req,
    ) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let metadata = RequestMetadata::new(Method::PATCH, path);
        self.call(metadata, Some(body)).await
    }

    /// Makes a DELETE request to the specified path.
    pub async fn delete(&self, path: impl Into<String>) -> Result<Response> {
        let metadata = RequestMetadata::new(Method::DELETE, path);
        self.call_empty::<()>(metadata, None).await
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use octocall::{ClientBuilder, retry::RetryConfig};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), octocall::Error> {
/// let client = ClientBuilder::new()
///     .base_url("https://github.example.com/api/v3")?
///     .token("ghp_example")
///     .user_agent("my-app/1.0")
///     .retry_config(
///         RetryConfig::builder()
///             .max_attempts(4)
///             .min_wait(Duration::from_secs(1))
///             .max_wait(Duration::from_secs(30))
///             .build(),
///     )
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<Url>,
    token: Option<String>,
    user_agent: String,
    default_headers: HeaderMap,
    http_client: Option<reqwest::Client>,
    timeout: Option<Duration>,
    retry_config: RetryConfig,
    rate_limit_handler: Option<Arc<dyn RateLimitHandler>>,
    observer: Option<Arc<dyn RequestObserver>>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            token: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_headers: HeaderMap::new(),
            http_client: None,
            timeout: None,
            retry_config: RetryConfig::default(),
            rate_limit_handler: None,
            observer: None,
        }
    }

    /// Sets the base URL for all requests. Defaults to [`DEFAULT_BASE_URL`].
    ///
    /// A trailing slash is added if missing, so that paths resolve below it.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or cannot serve as a base.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        let mut url = Url::parse(url.as_ref())?;
        if url.cannot_be_a_base() {
            return Err(Error::ConfigurationError(format!(
                "Base URL cannot be a base: {}",
                url
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = Some(url);
        Ok(self)
    }

    /// Sets the token sent as `Authorization: Bearer <token>`.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Uses a preconfigured `reqwest::Client` as transport.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the per-attempt request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the retry policy.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Replaces the default backoff wait with custom pacing.
    pub fn rate_limit_handler(mut self, handler: Arc<dyn RateLimitHandler>) -> Self {
        self.rate_limit_handler = Some(handler);
        self
    }

    /// Registers an observer for every attempt and response.
    pub fn observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the user agent or token are not valid header values, or
    /// if the HTTP client cannot be created.
    pub fn build(self) -> Result<Client> {
        let base_url = match self.base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL)?,
        };

        let mut default_headers = HeaderMap::new();
        default_headers.insert(header::ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        default_headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));
        default_headers.insert(
            header::USER_AGENT,
            HeaderValue::try_from(self.user_agent.as_str())
                .map_err(|e| Error::ConfigurationError(format!("Invalid user agent: {}", e)))?,
        );

        if let Some(token) = &self.token {
            let mut value = HeaderValue::try_from(format!("Bearer {}", token))
                .map_err(|e| Error::ConfigurationError(format!("Invalid token: {}", e)))?;
            value.set_sensitive(true);
            default_headers.insert(header::AUTHORIZATION, value);
        }

        default_headers.extend(self.default_headers);

        let http_client = match self.http_client {
            Some(client) => client,
            None => reqwest::Client::builder().build().map_err(|e| {
                Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?,
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                default_headers,
                timeout: self.timeout,
                retry_config: self.retry_config,
                rate_limit_handler: self.rate_limit_handler,
                observer: self.observer,
            }),
            cancel: CancellationToken::new(),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_sets_api_headers() {
        let client = Client::builder()
            .token("secret")
            .user_agent("tests/1.0")
            .build()
            .unwrap();

        let metadata = RequestMetadata::new(Method::GET, "/users/octocat")
            .with_query_param("per_page", "5")
            .with_query_param("page", "2");
        let request = client.build_request::<()>(&metadata, None).unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://api.github.com/users/octocat?per_page=5&page=2"
        );
        let headers = request.headers();
        assert_eq!(headers[header::ACCEPT], MEDIA_TYPE);
        assert_eq!(headers[API_VERSION_HEADER], API_VERSION);
        assert_eq!(headers[header::USER_AGENT], "tests/1.0");
        assert_eq!(headers[header::AUTHORIZATION], "Bearer secret");
        assert!(headers.get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_build_request_with_body() {
        let client = Client::builder().build().unwrap();
        let metadata = RequestMetadata::new(Method::POST, "repos/o/r/issues");
        let body = serde_json::json!({"title": "bug"});

        let request = client.build_request(&metadata, Some(&body)).unwrap();

        assert_eq!(request.headers()[header::CONTENT_TYPE], "application/json");
        assert!(request.headers().get(header::AUTHORIZATION).is_none());
        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(bytes, br#"{"title":"bug"}"#);
    }

    #[test]
    fn test_base_url_keeps_prefix() {
        let client = Client::builder()
            .base_url("https://github.example.com/api/v3")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "https://github.example.com/api/v3/");

        let request = client
            .build_request::<()>(&RequestMetadata::new(Method::GET, "user"), None)
            .unwrap();
        assert_eq!(request.url().as_str(), "https://github.example.com/api/v3/user");
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            Client::builder().base_url("not a url"),
            Err(Error::InvalidUrl(_))
        ));
        assert!(matches!(
            Client::builder().user_agent("bad\nagent").build(),
            Err(Error::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_with_cancellation_shares_configuration() {
        let client = Client::builder()
            .retry_config(RetryConfig::builder().max_attempts(3).build())
            .build()
            .unwrap();
        let token = CancellationToken::new();
        let scoped = client.with_cancellation(token.clone());

        token.cancel();
        assert!(scoped.cancellation_token().is_cancelled());
        assert!(!client.cancellation_token().is_cancelled());
        assert_eq!(scoped.retry_config().max_attempts, 3);
    }
}
