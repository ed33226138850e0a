//! Example demonstrating rate limit handling.
//!
//! This example shows how to:
//! - Read the rate limit snapshot from every response
//! - Tune the retry policy, or turn retrying off
//! - Inspect rate limit data on errors
//! - Pace retries with a custom handler
//! - Cancel a call that is waiting for the quota to reset
//! - Walk pages with the `Link` header
//!
//! Set `GITHUB_TOKEN` for the authenticated quota.
//!
//! Run with: `cargo run --example rate_limiting`

use octocall::{
    api::repositories::RepositoryListOptions, BoxError, CancellationToken, Client, Error,
    ListOptions, RateLimitHandler, Response, RetryConfig,
};
use std::sync::Arc;
use std::time::Duration;

struct PauseBriefly;

#[async_trait::async_trait]
impl RateLimitHandler for PauseBriefly {
    async fn handle(&self, response: &Response) -> Result<(), BoxError> {
        if response.rate.is_exhausted() {
            return Err(format!("quota exhausted until {}", response.rate.reset).into());
        }
        println!("  Server error {}, pausing 1s", response.status);
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("octocall=debug")
        .init();

    let token = std::env::var("GITHUB_TOKEN").ok();

    println!("=== Example 1: Default Retry Policy ===");
    println!("Rate limited and 500/502/503 responses are retried up to 10 times,");
    println!("waiting for the advertised reset or backing off from 5s to 60s.\n");

    let mut builder = Client::builder().timeout(Duration::from_secs(10));
    if let Some(token) = &token {
        builder = builder.token(token);
    }
    let client = builder.build()?;

    let overview = client.rate_limit().get().await?;
    println!("Core quota: {}/{}", overview.data.rate.remaining, overview.data.rate.limit);
    if let Some(search) = &overview.data.resources.search {
        println!("Search quota: {}/{}", search.remaining, search.limit);
    }
    println!();

    println!("=== Example 2: Rate Limit Data on Errors ===");

    let strict = Client::builder()
        .retry_config(RetryConfig::disabled())
        .build()?;

    match strict.users().get("octocat").await {
        Ok(user) => {
            println!("Fetched {} ({} requests left)", user.data.login, user.rate.remaining);
        }
        Err(e) if e.is_rate_limited() => {
            let rate = e.response().map(|r| r.rate).unwrap_or_default();
            println!("Rate limited, {} of {} used", rate.used, rate.limit);
            if let Some(reset_at) = rate.reset_at() {
                println!("Resets at {:?}", reset_at);
            }
        }
        Err(e) => println!("Request failed: {}", e),
    }
    println!();

    println!("=== Example 3: Custom Policy and Handler ===");

    let paced = Client::builder()
        .retry_config(
            RetryConfig::builder()
                .max_attempts(3)
                .min_wait(Duration::from_millis(500))
                .max_wait(Duration::from_secs(5))
                .build(),
        )
        .rate_limit_handler(Arc::new(PauseBriefly))
        .build()?;

    match paced.repositories().get("rust-lang", "rust").await {
        Ok(repo) => println!(
            "{} has {} stars (took {} attempt(s))",
            repo.data.full_name, repo.data.stargazers_count, repo.attempts
        ),
        Err(Error::RateLimitHandler { source, .. }) => println!("Handler gave up: {}", source),
        Err(Error::MaxAttemptsExceeded { attempts, .. }) => {
            println!("Still failing after {} attempts", attempts)
        }
        Err(e) => println!("Request failed: {}", e),
    }
    println!();

    println!("=== Example 4: Cancellation ===");

    let cancel = CancellationToken::new();
    let scoped = client.with_cancellation(cancel.clone());
    let call = tokio::spawn(async move { scoped.users().get("torvalds").await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    match call.await? {
        Ok(user) => println!("Finished before cancellation: {}", user.data.login),
        Err(e) if e.is_cancelled() => println!("Call cancelled"),
        Err(e) => println!("Request failed: {}", e),
    }
    println!();

    println!("=== Example 5: Pagination ===");

    let mut options = RepositoryListOptions {
        list: ListOptions::page(1).per_page(30),
        ..Default::default()
    };

    for _ in 0..3 {
        let page = client
            .repositories()
            .list_for_user("rust-lang", &options)
            .await?;
        println!(
            "Page {:?}: {} repos, {} requests left",
            options.list.page,
            page.data.len(),
            page.rate.remaining
        );
        if !page.pages.has_next() {
            break;
        }
        options.list.page = Some(page.pages.next);
    }

    Ok(())
}
