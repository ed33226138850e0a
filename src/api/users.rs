//! Users endpoints.

use crate::{metadata::RequestMetadata, Client, ListOptions, Response, Result};
use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Serialize};

/// A GitHub user account.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct User {
    pub id: u64,
    pub login: String,
    pub node_id: String,
    pub avatar_url: String,
    pub url: String,
    pub html_url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub blog: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub hireable: Option<bool>,
    pub bio: Option<String>,
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
    /// Only present on contributor listings.
    pub contributions: Option<u32>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Options for [`UsersApi::list`].
#[derive(Debug, Clone, Default)]
pub struct UsersListOptions {
    /// Only list users with an ID greater than this one.
    pub since: Option<u64>,
    pub list: ListOptions,
}

/// Profile fields to change; unset fields are left as they are.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hireable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Handler for `/users` and `/user` endpoints, see [`Client::users`].
pub struct UsersApi<'a> {
    client: &'a Client,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Public profile of `username`.
    pub async fn get(&self, username: &str) -> Result<Response<User>> {
        self.client.get(format!("users/{}", username)).await
    }

    /// Profile of the authenticated user.
    pub async fn authenticated(&self) -> Result<Response<User>> {
        self.client.get("user").await
    }

    /// All users, in signup order.
    pub async fn list(&self, options: &UsersListOptions) -> Result<Response<Vec<User>>> {
        let metadata = options
            .list
            .apply(RequestMetadata::new(Method::GET, "users"))
            .with_optional_param("since", options.since);
        self.client.call::<(), _>(metadata, None).await
    }

    /// Updates the authenticated user's profile.
    pub async fn update_authenticated(&self, update: &UserUpdate) -> Result<Response<User>> {
        self.client.patch("user", update).await
    }

    /// Users following the authenticated user.
    pub async fn followers(&self, options: &ListOptions) -> Result<Response<Vec<User>>> {
        let metadata = options.apply(RequestMetadata::new(Method::GET, "user/followers"));
        self.client.call::<(), _>(metadata, None).await
    }

    /// Users the authenticated user follows.
    pub async fn following(&self, options: &ListOptions) -> Result<Response<Vec<User>>> {
        let metadata = options.apply(RequestMetadata::new(Method::GET, "user/following"));
        self.client.call::<(), _>(metadata, None).await
    }

    /// Follows `username`.
    pub async fn follow(&self, username: &str) -> Result<Response> {
        let metadata = RequestMetadata::new(Method::PUT, format!("user/following/{}", username));
        self.client.call_empty::<()>(metadata, None).await
    }

    /// Unfollows `username`.
    pub async fn unfollow(&self, username: &str) -> Result<Response> {
        self.client
            .delete(format!("user/following/{}", username))
            .await
    }
}
