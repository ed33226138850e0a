//! Repositories endpoints.

use super::users::User;
use crate::{metadata::RequestMetadata, Client, ListOptions, Response, Result};
use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Serialize};

/// A repository.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Repository {
    pub id: u64,
    pub node_id: String,
    pub name: String,
    pub full_name: String,
    pub owner: Option<User>,
    pub private: bool,
    pub html_url: String,
    pub description: Option<String>,
    pub fork: bool,
    pub url: String,
    pub clone_url: String,
    pub mirror_url: Option<String>,
    pub homepage: Option<String>,
    pub language: Option<String>,
    pub forks_count: u32,
    pub stargazers_count: u32,
    pub watchers_count: u32,
    pub size: u64,
    pub default_branch: String,
    pub open_issues_count: u32,
    pub is_template: bool,
    pub topics: Vec<String>,
    pub has_issues: bool,
    pub has_projects: bool,
    pub has_wiki: bool,
    pub has_pages: bool,
    pub has_downloads: bool,
    pub archived: bool,
    pub disabled: bool,
    pub visibility: Option<String>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub permissions: Option<Permissions>,
}

/// The authenticated user's access to a repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Permissions {
    pub admin: bool,
    pub push: bool,
    pub pull: bool,
}

/// Body of [`RepositoriesApi::create`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewRepository {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_projects: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_wiki: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_discussions: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_init: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitignore_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_squash_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_merge_commit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_rebase_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_branch_on_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_template: Option<bool>,
}

impl NewRepository {
    /// A repository named `name` with server defaults for everything else.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Body of [`RepositoriesApi::update`]; unset fields are left as they are.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepositoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_issues: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_projects: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_wiki: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_template: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_squash_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_merge_commit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_rebase_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_auto_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_branch_on_merge: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_forking: Option<bool>,
}

/// Options for [`RepositoriesApi::list_for_user`].
#[derive(Debug, Clone, Default)]
pub struct RepositoryListOptions {
    /// `all`, `owner` or `member`.
    pub kind: Option<String>,
    /// `created`, `updated`, `pushed` or `full_name`.
    pub sort: Option<String>,
    /// `asc` or `desc`.
    pub direction: Option<String>,
    pub list: ListOptions,
}

/// Options for [`RepositoriesApi::contributors`].
#[derive(Debug, Clone, Default)]
pub struct ContributorListOptions {
    /// Include anonymous contributors.
    pub anon: bool,
    pub list: ListOptions,
}

/// Handler for `/repos` endpoints, see [`Client::repositories`].
pub struct RepositoriesApi<'a> {
    client: &'a Client,
}

impl<'a> RepositoriesApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, owner: &str, repo: &str) -> Result<Response<Repository>> {
        self.client.get(format!("repos/{}/{}", owner, repo)).await
    }

    /// Creates a repository owned by the authenticated user.
    pub async fn create(&self, repository: &NewRepository) -> Result<Response<Repository>> {
        self.client.post("user/repos", repository).await
    }

    pub async fn update(
        &self,
        owner: &str,
        repo: &str,
        update: &RepositoryUpdate,
    ) -> Result<Response<Repository>> {
        self.client
            .patch(format!("repos/{}/{}", owner, repo), update)
            .await
    }

    pub async fn delete(&self, owner: &str, repo: &str) -> Result<Response> {
        self.client.delete(format!("repos/{}/{}", owner, repo)).await
    }

    /// Public repositories of `owner`.
    pub async fn list_for_user(
        &self,
        owner: &str,
        options: &RepositoryListOptions,
    ) -> Result<Response<Vec<Repository>>> {
        let metadata = options
            .list
            .apply(RequestMetadata::new(Method::GET, format!("users/{}/repos", owner)))
            .with_optional_param("type", options.kind.as_deref())
            .with_optional_param("sort", options.sort.as_deref())
            .with_optional_param("direction", options.direction.as_deref());
        self.client.call::<(), _>(metadata, None).await
    }

    /// Contributors sorted by number of commits.
    pub async fn contributors(
        &self,
        owner: &str,
        repo: &str,
        options: &ContributorListOptions,
    ) -> Result<Response<Vec<User>>> {
        let metadata = options
            .list
            .apply(RequestMetadata::new(
                Method::GET,
                format!("repos/{}/{}/contributors", owner, repo),
            ))
            .with_optional_param("anon", options.anon.then_some("true"));
        self.client.call::<(), _>(metadata, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_repository_serializes_name_only() {
        assert_eq!(
            serde_json::to_value(NewRepository::new("sandbox")).unwrap(),
            serde_json::json!({"name": "sandbox"})
        );
    }

    #[test]
    fn test_repository_with_owner_and_permissions() {
        let repo: Repository = serde_json::from_str(
            r#"{
                "id": 1296269,
                "name": "Hello-World",
                "full_name": "octocat/Hello-World",
                "owner": {"login": "octocat", "id": 1},
                "description": null,
                "topics": ["octocat", "api"],
                "permissions": {"admin": false, "push": false, "pull": true}
            }"#,
        )
        .unwrap();

        assert_eq!(repo.full_name, "octocat/Hello-World");
        assert_eq!(repo.owner.unwrap().login, "octocat");
        assert!(repo.description.is_none());
        assert_eq!(repo.topics.len(), 2);
        assert!(repo.permissions.unwrap().pull);
    }
}
