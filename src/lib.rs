//! # Octocall - A rate-limit aware GitHub REST client
//!
//! Octocall is a typed GitHub REST API client built on top of `reqwest`. Every call
//! goes through one executor that reads the `X-RateLimit-*` headers, retries rate
//! limited and transient server failures with backoff, and exposes the rate limit
//! snapshot and `Link` header pagination on every response, including failed ones.
//!
//! ## Quick Start
//!
//! ```no_run
//! use octocall::{Client, ListOptions};
//! use octocall::api::issues::{IssueListOptions, NewIssue};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), octocall::Error> {
//!     let client = Client::builder()
//!         .token(std::env::var("GITHUB_TOKEN").unwrap_or_default())
//!         .build()?;
//!
//!     let user = client.users().get("octocat").await?;
//!     println!("{} has {} public repos", user.data.login, user.data.public_repos);
//!     println!("{} of {} requests left", user.rate.remaining, user.rate.limit);
//!
//!     let options = IssueListOptions {
//!         state: Some("open".to_string()),
//!         list: ListOptions::page(1).per_page(50),
//!         ..Default::default()
//!     };
//!     let issues = client.issues().list_for_repo("rust-lang", "rust", &options).await?;
//!     println!("{} issues, next page {}", issues.data.len(), issues.pages.next);
//!
//!     let created = client
//!         .issues()
//!         .create("me", "sandbox", &NewIssue::new("Found a bug"))
//!         .await?;
//!     println!("opened #{}", created.data.number);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Rate limit tracking** - `limit`, `remaining`, `used` and `reset` on every response
//! - **Automatic retries** - Rate limited (`403`/`429` with no quota left) and `500`/`502`/`503` responses are retried
//! - **Reset-aware backoff** - Waits until the advertised reset, or backs off exponentially between bounds
//! - **Pagination** - `prev`/`next`/`first`/`last` page numbers parsed from the `Link` header
//! - **Structured API errors** - GitHub's `message`, `documentation_url` and `errors` array
//! - **Cancellation** - A `CancellationToken` aborts in-flight calls and waits promptly
//! - **Hooks** - Observe every attempt, or replace the backoff wait with your own pacing
//! - **Automatic logging** - Structured logging with `tracing`
//!
//! ## Error Handling
//!
//! Failed calls still carry the response envelope when one was received:
//!
//! ```no_run
//! use octocall::{Client, Error};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::builder().build()?;
//! match client.repositories().get("rust-lang", "rust").await {
//!     Ok(repo) => println!("{} stars", repo.data.stargazers_count),
//!     Err(Error::Api(api)) => {
//!         eprintln!("GitHub said {}: {}", api.status_code, api.message);
//!         for detail in &api.errors {
//!             eprintln!("  {} {} {}", detail.resource, detail.field, detail.code);
//!         }
//!     }
//!     Err(Error::MaxAttemptsExceeded { attempts, response }) => {
//!         eprintln!("still rate limited after {} attempts", attempts);
//!         eprintln!("quota resets at {}", response.rate.reset);
//!     }
//!     Err(Error::DeserializationFailed { raw_response, serde_error, .. }) => {
//!         eprintln!("unexpected payload ({}): {}", serde_error, raw_response);
//!     }
//!     Err(e) => eprintln!("request failed: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Retry Policy
//!
//! ```no_run
//! use octocall::{Client, RetryConfig};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), octocall::Error> {
//! let client = Client::builder()
//!     .retry_config(
//!         RetryConfig::builder()
//!             .max_attempts(5)
//!             .min_wait(Duration::from_secs(2))
//!             .max_wait(Duration::from_secs(30))
//!             .build(),
//!     )
//!     .build()?;
//!
//! // Fail fast instead: retry-eligible responses become `Error::Api`.
//! let strict = Client::builder()
//!     .retry_config(RetryConfig::disabled())
//!     .build()?;
//! # Ok(())
//! # }
//! ```

pub mod api;
mod client;
mod error;
pub mod hooks;
pub mod metadata;
pub mod pagination;
pub mod rate_limit;
mod response;
pub mod retry;

pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL};
pub use error::{ApiError, BoxError, Error, ErrorDetail, Result};
pub use hooks::{RateLimitHandler, RequestObserver};
pub use pagination::{ListOptions, Pagination};
pub use rate_limit::RateLimit;
pub use response::Response;
pub use retry::RetryConfig;
pub use tokio_util::sync::CancellationToken;
