//! Search endpoints.

use super::{repositories::Repository, users::User};
use crate::{metadata::RequestMetadata, Client, ListOptions, Response, Result};
use http::Method;
use serde::{Deserialize, Serialize};

/// One page of search hits.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchResults<T> {
    /// Total number of matches across all pages.
    #[serde(default)]
    pub total_count: u64,
    /// `true` when the search timed out before finding every match.
    #[serde(default)]
    pub incomplete_results: bool,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Options shared by the search endpoints.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Endpoint specific, e.g. `stars` or `followers`. Best match when unset.
    pub sort: Option<String>,
    /// `asc` or `desc`.
    pub order: Option<String>,
    pub list: ListOptions,
}

/// Handler for `/search` endpoints, see [`Client::search`].
pub struct SearchApi<'a> {
    client: &'a Client,
}

impl<'a> SearchApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Searches repositories with GitHub's query syntax, e.g. `"tokio language:rust"`.
    pub async fn repositories(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Response<SearchResults<Repository>>> {
        self.search("search/repositories", query, options).await
    }

    /// Searches users, e.g. `"location:berlin followers:>100"`.
    pub async fn users(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Response<SearchResults<User>>> {
        self.search("search/users", query, options).await
    }

    async fn search<T>(
        &self,
        path: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Response<SearchResults<T>>>
    where
        T: serde::de::DeserializeOwned,
    {
        let metadata = options
            .list
            .apply(RequestMetadata::new(Method::GET, path))
            .with_optional_param("order", options.order.as_deref())
            .with_optional_param("sort", options.sort.as_deref())
            .with_query_param("q", query.trim());
        self.client.call::<(), _>(metadata, None).await
    }
}
