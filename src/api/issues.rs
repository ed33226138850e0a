//! Issues and issue comments endpoints.

use super::{query_timestamp, users::User};
use crate::{metadata::RequestMetadata, Client, ListOptions, Response, Result};
use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Serialize};

/// A label attached to an issue or pull request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Label {
    pub id: u64,
    pub url: String,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Issue {
    pub id: u64,
    pub url: String,
    pub repository_url: String,
    pub html_url: String,
    pub number: u64,
    /// `open` or `closed`.
    pub state: String,
    pub state_reason: Option<String>,
    pub title: String,
    pub body: Option<String>,
    pub labels: Vec<Label>,
    pub user: Option<User>,
    pub assignee: Option<User>,
    pub assignees: Vec<User>,
    pub locked: bool,
    pub active_lock_reason: Option<String>,
    pub comments: u32,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_by: Option<User>,
}

/// Body of [`IssuesApi::create`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewIssue {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
    /// Label names.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    /// Logins to assign.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
}

impl NewIssue {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// Body of [`IssuesApi::update`]; unset fields are left as they are.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IssueUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// `open` or `closed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// `completed`, `not_planned` or `reopened`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
}

/// Why an issue conversation is locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LockReason {
    #[serde(rename = "off-topic")]
    OffTopic,
    #[serde(rename = "too heated")]
    TooHeated,
    Resolved,
    Spam,
}

#[derive(Serialize)]
struct LockBody {
    lock_reason: LockReason,
}

/// Options for [`IssuesApi::list_for_repo`].
#[derive(Debug, Clone, Default)]
pub struct IssueListOptions {
    /// `open`, `closed` or `all`.
    pub state: Option<String>,
    /// A login, `none` or `*`.
    pub assignee: Option<String>,
    pub creator: Option<String>,
    pub mentioned: Option<String>,
    /// Label names; issues must carry all of them.
    pub labels: Vec<String>,
    /// Only issues updated at or after this time.
    pub since: Option<DateTime<Utc>>,
    /// `created`, `updated` or `comments`.
    pub sort: Option<String>,
    /// `asc` or `desc`.
    pub direction: Option<String>,
    pub list: ListOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IssueComment {
    pub id: u64,
    pub url: String,
    pub html_url: String,
    pub body: String,
    pub user: Option<User>,
    pub issue_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

/// Options for [`IssuesApi::list_repo_comments`].
#[derive(Debug, Clone, Default)]
pub struct IssueCommentListOptions {
    pub since: Option<DateTime<Utc>>,
    /// `created` or `updated`.
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub list: ListOptions,
}

/// Handler for issue endpoints, see [`Client::issues`].
pub struct IssuesApi<'a> {
    client: &'a Client,
}

impl<'a> IssuesApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, owner: &str, repo: &str, number: u64) -> Result<Response<Issue>> {
        self.client
            .get(format!("repos/{}/{}/issues/{}", owner, repo, number))
            .await
    }

    pub async fn create(&self, owner: &str, repo: &str, issue: &NewIssue) -> Result<Response<Issue>> {
        self.client
            .post(format!("repos/{}/{}/issues", owner, repo), issue)
            .await
    }

    pub async fn update(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        update: &IssueUpdate,
    ) -> Result<Response<Issue>> {
        self.client
            .patch(format!("repos/{}/{}/issues/{}", owner, repo, number), update)
            .await
    }

    /// Locks the conversation, optionally recording a reason.
    pub async fn lock(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        reason: Option<LockReason>,
    ) -> Result<Response> {
        let metadata = RequestMetadata::new(
            Method::PUT,
            format!("repos/{}/{}/issues/{}/lock", owner, repo, number),
        );
        let body = reason.map(|lock_reason| LockBody { lock_reason });
        self.client.call_empty(metadata, body.as_ref()).await
    }

    pub async fn unlock(&self, owner: &str, repo: &str, number: u64) -> Result<Response> {
        self.client
            .delete(format!("repos/{}/{}/issues/{}/lock", owner, repo, number))
            .await
    }

    /// Issues and pull requests of a repository.
    pub async fn list_for_repo(
        &self,
        owner: &str,
        repo: &str,
        options: &IssueListOptions,
    ) -> Result<Response<Vec<Issue>>> {
        let labels = (!options.labels.is_empty()).then(|| options.labels.join(","));
        let metadata = options
            .list
            .apply(RequestMetadata::new(
                Method::GET,
                format!("repos/{}/{}/issues", owner, repo),
            ))
            .with_optional_param("state", options.state.as_deref())
            .with_optional_param("assignee", options.assignee.as_deref())
            .with_optional_param("creator", options.creator.as_deref())
            .with_optional_param("mentioned", options.mentioned.as_deref())
            .with_optional_param("labels", labels)
            .with_optional_param("since", options.since.as_ref().map(query_timestamp))
            .with_optional_param("sort", options.sort.as_deref())
            .with_optional_param("direction", options.direction.as_deref());
        self.client.call::<(), _>(metadata, None).await
    }

    pub async fn create_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<Response<IssueComment>> {
        self.client
            .post(
                format!("repos/{}/{}/issues/{}/comments", owner, repo, number),
                &CommentBody { body },
            )
            .await
    }

    /// Comments on all issues of a repository.
    pub async fn list_repo_comments(
        &self,
        owner: &str,
        repo: &str,
        options: &IssueCommentListOptions,
    ) -> Result<Response<Vec<IssueComment>>> {
        let metadata = options
            .list
            .apply(RequestMetadata::new(
                Method::GET,
                format!("repos/{}/{}/issues/comments", owner, repo),
            ))
            .with_optional_param("since", options.since.as_ref().map(query_timestamp))
            .with_optional_param("sort", options.sort.as_deref())
            .with_optional_param("direction", options.direction.as_deref());
        self.client.call::<(), _>(metadata, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_reason_wire_names() {
        let body = LockBody {
            lock_reason: LockReason::TooHeated,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"lock_reason":"too heated"}"#
        );
    }

    #[test]
    fn test_issue_with_labels_and_closed_at() {
        let issue: Issue = serde_json::from_str(
            r#"{
                "number": 1347,
                "state": "closed",
                "title": "Found a bug",
                "body": null,
                "labels": [{"id": 208045946, "name": "bug", "color": "f29513", "default": true}],
                "closed_at": "2011-04-22T13:33:48Z",
                "closed_by": null
            }"#,
        )
        .unwrap();

        assert_eq!(issue.number, 1347);
        assert_eq!(issue.labels[0].name, "bug");
        assert!(issue.labels[0].default);
        assert!(issue.closed_at.is_some());
        assert!(issue.closed_by.is_none());
    }
}
