//! Pull request endpoints.

use super::{issues::Label, users::User};
use crate::{metadata::RequestMetadata, Client, ListOptions, Response, Result};
use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PullRequest {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    /// `open` or `closed`.
    pub state: String,
    pub locked: bool,
    pub active_lock_reason: Option<String>,
    pub draft: bool,
    pub merged: bool,
    pub merge_commit_sha: Option<String>,
    pub labels: Vec<Label>,
    pub user: Option<User>,
    pub assignee: Option<User>,
    pub assignees: Vec<User>,
    pub requested_reviewers: Vec<User>,
    pub head: Option<Branch>,
    pub base: Option<Branch>,
    pub url: String,
    pub html_url: String,
    pub diff_url: String,
    pub patch_url: String,
    pub issue_url: String,
    pub commits_url: String,
    pub comments_url: String,
    pub statuses_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
}

/// One end of a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Branch {
    /// `owner:branch`.
    pub label: String,
    #[serde(rename = "ref")]
    pub branch: String,
    pub sha: String,
}

/// Body of [`PullsApi::create`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewPullRequest {
    /// The branch with the changes, `owner:branch` for cross-repository pulls.
    pub head: String,
    /// The branch to merge into.
    pub base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_repo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintainer_can_modify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    /// Converts an existing issue instead of giving a title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<u64>,
}

impl NewPullRequest {
    pub fn new(title: impl Into<String>, head: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            head: head.into(),
            base: base.into(),
            title: Some(title.into()),
            ..Default::default()
        }
    }
}

/// Body of [`PullsApi::update`]; unset fields are left as they are.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PullRequestUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintainer_can_modify: Option<bool>,
}

/// Body of [`PullsApi::merge`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
    /// Head SHA the pull request must still point at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
    /// `merge`, `squash` or `rebase`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_method: Option<String>,
}

/// Outcome of [`PullsApi::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MergeResult {
    pub sha: String,
    pub merged: bool,
    pub message: String,
}

/// Options for [`PullsApi::list`].
#[derive(Debug, Clone, Default)]
pub struct PullRequestListOptions {
    /// `open`, `closed` or `all`.
    pub state: Option<String>,
    /// `user:ref-name`.
    pub head: Option<String>,
    pub base: Option<String>,
    /// `created`, `updated`, `popularity` or `long-running`.
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub list: ListOptions,
}

/// Handler for pull request endpoints, see [`Client::pulls`].
pub struct PullsApi<'a> {
    client: &'a Client,
}

impl<'a> PullsApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, owner: &str, repo: &str, number: u64) -> Result<Response<PullRequest>> {
        self.client
            .get(format!("repos/{}/{}/pulls/{}", owner, repo, number))
            .await
    }

    pub async fn create(
        &self,
        owner: &str,
        repo: &str,
        pull: &NewPullRequest,
    ) -> Result<Response<PullRequest>> {
        self.client
            .post(format!("repos/{}/{}/pulls", owner, repo), pull)
            .await
    }

    pub async fn update(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        update: &PullRequestUpdate,
    ) -> Result<Response<PullRequest>> {
        self.client
            .patch(format!("repos/{}/{}/pulls/{}", owner, repo, number), update)
            .await
    }

    /// Merges the pull request. A `405` (not mergeable) or `409` (head moved)
    /// comes back as [`Error::Api`](crate::Error::Api).
    pub async fn merge(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        merge: &MergeRequest,
    ) -> Result<Response<MergeResult>> {
        self.client
            .put(format!("repos/{}/{}/pulls/{}/merge", owner, repo, number), merge)
            .await
    }

    pub async fn list(
        &self,
        owner: &str,
        repo: &str,
        options: &PullRequestListOptions,
    ) -> Result<Response<Vec<PullRequest>>> {
        let metadata = options
            .list
            .apply(RequestMetadata::new(
                Method::GET,
                format!("repos/{}/{}/pulls", owner, repo),
            ))
            .with_optional_param("state", options.state.as_deref())
            .with_optional_param("head", options.head.as_deref())
            .with_optional_param("base", options.base.as_deref())
            .with_optional_param("sort", options.sort.as_deref())
            .with_optional_param("direction", options.direction.as_deref());
        self.client.call::<(), _>(metadata, None).await
    }
}
