//! The `/rate_limit` endpoint.
//!
//! Reading it does not count against the primary quota.

use crate::{Client, RateLimit, Response, Result};
use serde::Deserialize;

/// Quotas of every rate limit bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RateLimitOverview {
    pub resources: RateLimitResources,
    /// The core bucket, kept at the top level for older clients.
    pub rate: RateLimit,
}

/// Per-bucket quotas. Buckets the server does not report are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RateLimitResources {
    pub core: Option<RateLimit>,
    pub search: Option<RateLimit>,
    pub graphql: Option<RateLimit>,
    pub integration_manifest: Option<RateLimit>,
    pub source_import: Option<RateLimit>,
    pub code_scanning_upload: Option<RateLimit>,
    pub code_scanning_autofix: Option<RateLimit>,
    pub actions_runner_registration: Option<RateLimit>,
    pub scim: Option<RateLimit>,
    pub dependency_snapshots: Option<RateLimit>,
    pub code_search: Option<RateLimit>,
}

/// Handler for the rate limit endpoint, see [`Client::rate_limit`].
pub struct RateLimitApi<'a> {
    client: &'a Client,
}

impl<'a> RateLimitApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> Result<Response<RateLimitOverview>> {
        self.client.get("rate_limit").await
    }
}
