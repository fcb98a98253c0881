//! GitHub API client for relnote.
//!
//! This crate provides the typed access layer the release-notes tooling uses
//! to read closed issues and pull requests, replace issue labels and check
//! rate limits.
//!
//! # Overview
//!
//! The crate provides:
//!
//! - [`RepoApiClient`]: The API client, built with [`RepoApiClient::builder`]
//! - [`Issue`], [`PullRequest`]: Records decoded from API responses
//! - [`RateLimitSnapshot`] and [`Quota`]: Rate limit status
//! - [`PageCursor`] and [`Page`]: Caller-driven pagination
//! - [`ResponseCache`]: On-disk HTTP cache with conditional revalidation
//! - [`RequestPipeline`]: Ordered request interceptors
//! - [`Error`]: Error types for GitHub API operations
//!
//! # Authentication
//!
//! The client supports both authenticated and unauthenticated access:
//!
//! - **Authenticated**: 5,000 requests/hour, access to private repos
//! - **Unauthenticated**: 60 requests/hour, public repos only
//!
//! An empty token means anonymous access; otherwise every request carries
//! exactly one `Authorization: token …` header. Tokens are handled as
//! [`secrecy::SecretString`] so they never end up in logs.
//!
//! # Caching
//!
//! GET responses are stored under `.relnote-http-cache/` (10 MiB by
//! default). A fresh entry is served without a round trip; a stale one is
//! revalidated with `If-None-Match` / `If-Modified-Since` and its body reused
//! on `304 Not Modified`. Label updates drop the cached entry of the issue
//! they modify.
//!
//! # Examples
//!
//! Walking all closed issues with a label:
//!
//! ```no_run
//! use secrecy::SecretString;
//! use relnote_github::{PageCursor, RepoApiClient};
//!
//! # async fn example() -> relnote_github::Result<()> {
//! let client = RepoApiClient::with_token(SecretString::from("ghp_xxx".to_string()))?;
//!
//! let mut cursor = PageCursor::new();
//! while let Some(page) = cursor.next_page() {
//!     let issues = client
//!         .list_closed_issues("owner", "repo", "changelog", page)
//!         .await?;
//!     cursor.advance(issues.len());
//!     for issue in issues.iter().filter(|i| !i.is_pull_request()) {
//!         println!("#{} {}", issue.number, issue.title);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Checking the quota before a burst of requests:
//!
//! ```no_run
//! use relnote_github::RepoApiClient;
//!
//! # async fn example(client: RepoApiClient) -> relnote_github::Result<()> {
//! let limits = client.get_rate_limit().await?;
//! for (bucket, quota) in limits.buckets() {
//!     println!("{bucket}: {}/{}", quota.remaining, quota.limit);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod error;
pub mod http;
pub mod model;
pub mod pagination;
pub mod pipeline;
pub mod rate_limit;

pub use cache::{CachedResponse, ResponseCache};
pub use client::{ClientBuilder, DEFAULT_API_URL, RepoApiClient};
pub use error::{Error, Result};
pub use http::{HttpError, HttpMethod, HttpRequest, HttpResponse, HttpTransport};
pub use model::{GitRef, Issue, IssueKind, IssueLabelsPatch, Label, PullRequest, User};
pub use pagination::{PER_PAGE, Page, PageCursor, PageLinks, is_last_page};
pub use pipeline::{Interceptor, RequestPipeline};
pub use rate_limit::{Quota, QuotaBucket, RateLimitSnapshot};
