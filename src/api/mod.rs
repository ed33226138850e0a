//! Typed wrappers for GitHub REST resources.
//!
//! Each handler borrows the [`Client`](crate::Client) it was obtained from and maps
//! one endpoint per method onto the shared executor, so every call gets the same
//! rate limit handling, retries and pagination metadata. List endpoints return a
//! `Response<Vec<_>>` whose [`pages`](crate::Response::pages) tell where to go next.

pub mod issues;
pub mod pulls;
pub mod rate_limit;
pub mod repositories;
pub mod search;
pub mod users;

pub use issues::IssuesApi;
pub use pulls::PullsApi;
pub use rate_limit::RateLimitApi;
pub use repositories::RepositoriesApi;
pub use search::SearchApi;
pub use users::UsersApi;

use chrono::{DateTime, SecondsFormat, Utc};

/// Formats a timestamp the way query parameters such as `since` expect it.
pub(crate) fn query_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}
