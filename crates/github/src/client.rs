//! GitHub API client implementation.
//!
//! This module provides the [`RepoApiClient`] struct, the single access point
//! the changelog tooling uses to read issues, pull requests and rate limits,
//! and to replace issue labels.
//!
//! Every request flows through the same stages:
//!
//! 1. default headers (`Accept`, `User-Agent`)
//! 2. the [`RequestPipeline`]: authorization first, then caller interceptors
//! 3. the on-disk [`ResponseCache`] (GET only)
//! 4. the [`HttpTransport`]

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::cache::{CachedResponse, DEFAULT_CACHE_DIR, DEFAULT_CAPACITY_BYTES, ResponseCache};
use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::model::{Issue, IssueLabelsPatch, PullRequest};
use crate::pagination::{PER_PAGE, Page, PageLinks};
use crate::pipeline::{self, Interceptor, RequestPipeline};
use crate::rate_limit::{Quota, RateLimitSnapshot};

/// Root of the public GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Characters escaped inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Builder for [`RepoApiClient`].
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use secrecy::SecretString;
/// use relnote_github::RepoApiClient;
///
/// # fn example() -> relnote_github::Result<()> {
/// let client = RepoApiClient::builder()
///     .base_url("https://ghe.example.com/api/v3")
///     .token(SecretString::from("ghp_xxx".to_string()))
///     .cache_dir("/tmp/relnote-cache")
///     .timeout(Duration::from_secs(10))
///     .interceptor(|mut req| {
///         req.set_header("X-Trace", "1");
///         req
///     })
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: String,
    token: Option<SecretString>,
    interceptors: Vec<Interceptor>,
    cache_dir: PathBuf,
    cache_capacity: u64,
    timeout: Duration,
    user_agent: String,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: None,
            interceptors: Vec::new(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            cache_capacity: DEFAULT_CAPACITY_BYTES,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("relnote/{}", env!("CARGO_PKG_VERSION")),
            transport: None,
        }
    }
}

impl ClientBuilder {
    /// Sets the API root (defaults to [`DEFAULT_API_URL`]).
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the token sent as `Authorization: token …`.
    ///
    /// An empty token leaves the client anonymous.
    #[must_use]
    pub fn token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    /// Appends a request interceptor.
    ///
    /// Interceptors see every request after the authorization step, in the
    /// order they were added.
    #[must_use]
    pub fn interceptor<F>(mut self, interceptor: F) -> Self
    where
        F: Fn(HttpRequest) -> HttpRequest + Send + Sync + 'static,
    {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Sets the response cache directory (defaults to [`DEFAULT_CACHE_DIR`]).
    #[must_use]
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Sets the response cache capacity in bytes.
    #[must_use]
    pub fn cache_capacity(mut self, bytes: u64) -> Self {
        self.cache_capacity = bytes;
        self
    }

    /// Sets the per-request deadline of the default transport.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Replaces the reqwest transport.
    #[must_use]
    pub fn transport<T>(mut self, transport: T) -> Self
    where
        T: HttpTransport + 'static,
    {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the base URL is invalid, the cache
    /// directory cannot be created, or the HTTP client fails to build.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub fn build(self) -> Result<RepoApiClient> {
        let base_url = normalize_base_url(&self.base_url)?;
        let cache = ResponseCache::with_capacity(&self.cache_dir, self.cache_capacity)?;

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(
                ReqwestTransport::with_timeout(self.timeout)
                    .map_err(|e| Error::configuration(e.to_string()))?,
            ),
        };

        let auth = self.token.as_ref().and_then(pipeline::authorization);
        let authenticated = auth.is_some();
        let pipeline = auth
            .into_iter()
            .chain(self.interceptors)
            .fold(RequestPipeline::new(), RequestPipeline::then_shared);

        debug!(
            authenticated,
            interceptors = pipeline.len(),
            cache_dir = ?cache.path(),
            "created GitHub client"
        );

        Ok(RepoApiClient {
            inner: Arc::new(Inner {
                base_url,
                pipeline,
                cache,
                transport,
                authenticated,
                user_agent: self.user_agent,
            }),
        })
    }
}

/// Normalizes the API root so its path always ends with `/`.
///
/// Relative endpoint paths are resolved against it, which keeps any path
/// prefix such as `/api/v3` on enterprise installs. A query or fragment
/// would be dropped by that resolution, so it is rejected.
fn normalize_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let mut url = Url::parse(raw)
        .map_err(|e| Error::configuration(format!("invalid base URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::configuration(format!(
            "unsupported base URL scheme '{}'",
            url.scheme()
        )));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(Error::configuration(format!(
            "base URL '{raw}' must not have a query or fragment"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

struct Inner {
    base_url: Url,
    pipeline: RequestPipeline,
    cache: ResponseCache,
    transport: Arc<dyn HttpTransport>,
    authenticated: bool,
    user_agent: String,
}

/// Whether a fresh cache entry may answer a GET without a round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Freshness {
    AllowFresh,
    AlwaysRevalidate,
}

/// GitHub API client with optional authentication and a disk response cache.
///
/// Cloning is cheap and clones share the connection pool and the cache, so
/// one client can serve concurrent callers. Every operation is a single
/// request: there is no retry, throttling or page aggregation.
///
/// # Security
///
/// The token is held as a [`SecretString`] and never appears in `Debug`
/// output.
#[derive(Clone)]
pub struct RepoApiClient {
    inner: Arc<Inner>,
}

impl fmt::Debug for RepoApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("authenticated", &self.inner.authenticated)
            .field("pipeline", &self.inner.pipeline)
            .field("cache", &self.inner.cache.path())
            .finish_non_exhaustive()
    }
}

impl RepoApiClient {
    /// Returns a builder with default settings.
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Creates a client bound to `base_url`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root; a trailing `/` is added when missing
    /// * `token` - personal access token; empty means anonymous access
    /// * `interceptor` - optional request transform applied after authorization
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the base URL is invalid or the
    /// cache directory cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use secrecy::SecretString;
    /// use relnote_github::RepoApiClient;
    ///
    /// # fn example() -> relnote_github::Result<()> {
    /// let client = RepoApiClient::new(
    ///     "https://api.github.com",
    ///     SecretString::from(String::new()),
    ///     None,
    /// )?;
    /// assert!(!client.is_authenticated());
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        base_url: &str,
        token: SecretString,
        interceptor: Option<Interceptor>,
    ) -> Result<Self> {
        let mut builder = Self::builder().base_url(base_url).token(token);
        if let Some(interceptor) = interceptor {
            builder.interceptors.push(interceptor);
        }
        builder.build()
    }

    /// Creates a client for the public API at [`DEFAULT_API_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the cache directory cannot be
    /// created.
    pub fn with_token(token: SecretString) -> Result<Self> {
        Self::builder().token(token).build()
    }

    /// Returns whether requests carry an `Authorization` header.
    ///
    /// Authenticated clients get 5,000 requests/hour instead of 60.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.authenticated
    }

    /// Returns the normalized API root (always ends with `/`).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Returns the response cache.
    #[must_use]
    pub fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }

    /// Lists one page of closed issues, pull requests included.
    ///
    /// The issues endpoint returns pull requests as well; check
    /// [`Issue::kind`](crate::Issue) to tell them apart. Pages hold at most
    /// [`PER_PAGE`] entries and a shorter page is the last one.
    ///
    /// # Arguments
    ///
    /// * `owner` - Repository owner (e.g., "rust-lang")
    /// * `repo` - Repository name (e.g., "rust")
    /// * `labels` - Comma-separated label filter; empty for no filter
    /// * `page` - 1-based page number (0 is treated as 1)
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, such as:
    /// - Repository not found (404)
    /// - Rate limit exceeded
    /// - Network errors
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use relnote_github::{RepoApiClient, is_last_page};
    ///
    /// # async fn example(client: RepoApiClient) -> relnote_github::Result<()> {
    /// let issues = client
    ///     .list_closed_issues("rust-lang", "rust", "relnotes", 1)
    ///     .await?;
    /// let plain = issues.iter().filter(|i| !i.is_pull_request()).count();
    /// println!("{plain} issues, last page: {}", is_last_page(issues.len()));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_closed_issues(
        &self,
        owner: &str,
        repo: &str,
        labels: &str,
        page: u32,
    ) -> Result<Vec<Issue>> {
        Ok(self
            .list_closed_issues_page(owner, repo, labels, page)
            .await?
            .items)
    }

    /// Like [`list_closed_issues`](Self::list_closed_issues), also returning
    /// the `Link` header navigation.
    ///
    /// # Errors
    ///
    /// Same as [`list_closed_issues`](Self::list_closed_issues).
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn list_closed_issues_page(
        &self,
        owner: &str,
        repo: &str,
        labels: &str,
        page: u32,
    ) -> Result<Page<Issue>> {
        let page = page.max(1);
        let mut query = vec![
            ("filter", "all".to_string()),
            ("state", "closed".to_string()),
            ("per_page", PER_PAGE.to_string()),
        ];
        if !labels.is_empty() {
            query.push(("labels", labels.to_string()));
        }
        query.push(("page", page.to_string()));

        let url = self.endpoint(&["repos", owner, repo, "issues"], &query)?;
        let page: Page<Issue> = self.get_page(url).await?;
        debug!(
            count = page.items.len(),
            pull_requests = page.items.iter().filter(|i| i.is_pull_request()).count(),
            "listed closed issues"
        );
        Ok(page)
    }

    /// Lists one page of closed pull requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use relnote_github::RepoApiClient;
    ///
    /// # async fn example(client: RepoApiClient) -> relnote_github::Result<()> {
    /// for pr in client.list_closed_pull_requests("rust-lang", "rust", 1).await? {
    ///     if pr.is_merged() {
    ///         println!("#{} {}", pr.number, pr.title);
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_closed_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
    ) -> Result<Vec<PullRequest>> {
        Ok(self
            .list_closed_pull_requests_page(owner, repo, page)
            .await?
            .items)
    }

    /// Like [`list_closed_pull_requests`](Self::list_closed_pull_requests),
    /// also returning the `Link` header navigation.
    ///
    /// # Errors
    ///
    /// Same as [`list_closed_pull_requests`](Self::list_closed_pull_requests).
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn list_closed_pull_requests_page(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
    ) -> Result<Page<PullRequest>> {
        let query = [
            ("state", "closed".to_string()),
            ("per_page", PER_PAGE.to_string()),
            ("page", page.max(1).to_string()),
        ];
        let url = self.endpoint(&["repos", owner, repo, "pulls"], &query)?;
        let page: Page<PullRequest> = self.get_page(url).await?;
        debug!(count = page.items.len(), "listed closed pull requests");
        Ok(page)
    }

    /// Fetches a single pull request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no pull request has that number.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequest> {
        let number = number.to_string();
        let url = self.endpoint(&["repos", owner, repo, "pulls", &number], &[])?;
        let response = self.get(&url, Freshness::AllowFresh).await?;
        decode(&url, &response)
    }

    /// Fetches a single issue (which may be a pull request).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no issue has that number.
    #[instrument(skip(self), fields(owner = %owner, repo = %repo))]
    pub async fn get_issue(&self, owner: &str, repo: &str, number: u64) -> Result<Issue> {
        let number = number.to_string();
        let url = self.endpoint(&["repos", owner, repo, "issues", &number], &[])?;
        let response = self.get(&url, Freshness::AllowFresh).await?;
        decode(&url, &response)
    }

    /// Replaces the full label set of an issue.
    ///
    /// Returns the issue as updated by the server. There is no precondition:
    /// concurrent editors overwrite each other, last writer wins. The call is
    /// not retried; re-read the issue to confirm the outcome after a failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails (missing permissions surface as
    /// [`Error::NotFound`] or [`Error::Api`]).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use relnote_github::RepoApiClient;
    ///
    /// # async fn example(client: RepoApiClient) -> relnote_github::Result<()> {
    /// let issue = client
    ///     .set_issue_labels("owner", "repo", 42, ["changelog", "bug"])
    ///     .await?;
    /// assert!(issue.has_label("changelog"));
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self, labels), fields(owner = %owner, repo = %repo))]
    pub async fn set_issue_labels<I, S>(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: I,
    ) -> Result<Issue>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patch = IssueLabelsPatch::new(labels);
        debug!(labels = ?patch.labels, "replacing issue labels");

        let number = number.to_string();
        let url = self.endpoint(&["repos", owner, repo, "issues", &number], &[])?;
        let body = serde_json::to_vec(&patch).map_err(|source| Error::Decode {
            url: url.clone(),
            source,
        })?;

        let mut request = self.request(HttpMethod::Patch, &url);
        request.set_header("Content-Type", "application/json");
        request.body = body;

        let response = self.execute(request, Freshness::AlwaysRevalidate).await?;
        decode(&url, &response)
    }

    /// Reads the current rate-limit status.
    ///
    /// The call does not count against the core quota. It is always
    /// revalidated with the server, never answered from a fresh cache entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use relnote_github::RepoApiClient;
    ///
    /// # async fn example(client: RepoApiClient) -> relnote_github::Result<()> {
    /// let limits = client.get_rate_limit().await?;
    /// if limits.core().remaining < 100 {
    ///     println!("only {} requests left", limits.core().remaining);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self))]
    pub async fn get_rate_limit(&self) -> Result<RateLimitSnapshot> {
        let url = self.endpoint(&["rate_limit"], &[])?;
        let response = self.get(&url, Freshness::AlwaysRevalidate).await?;
        let snapshot: RateLimitSnapshot = decode(&url, &response)?;
        debug!(
            core_remaining = snapshot.core().remaining,
            core_limit = snapshot.core().limit,
            "fetched rate limit"
        );
        Ok(snapshot)
    }

    /// Resolves an endpoint below the base URL.
    ///
    /// Empty and dot segments are rejected: `Url::join` would resolve them
    /// (even percent-encoded) and the request could leave the base path.
    fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<String> {
        if let Some(bad) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(Error::InvalidPathSegment {
                segment: (*bad).to_string(),
            });
        }
        let path = segments
            .iter()
            .map(|s| utf8_percent_encode(s, PATH_SEGMENT).to_string())
            .collect::<Vec<_>>()
            .join("/");
        let mut url = self
            .inner
            .base_url
            .join(&path)
            .map_err(|e| Error::configuration(format!("invalid endpoint '{path}': {e}")))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url.into())
    }

    fn request(&self, method: HttpMethod, url: &str) -> HttpRequest {
        let mut request = HttpRequest::new(method, url);
        request.set_header("Accept", "application/vnd.github+json");
        request.set_header("User-Agent", self.inner.user_agent.clone());
        request
    }

    async fn get(&self, url: &str, freshness: Freshness) -> Result<HttpResponse> {
        self.execute(self.request(HttpMethod::Get, url), freshness).await
    }

    async fn get_page<T: DeserializeOwned>(&self, url: String) -> Result<Page<T>> {
        let response = self.get(&url, Freshness::AllowFresh).await?;
        let items: Vec<T> = decode(&url, &response)?;
        Ok(Page {
            items,
            links: PageLinks::from_response(&response),
        })
    }

    /// Runs `request` through the pipeline and the cache, then checks the
    /// status. Only successful responses come back as `Ok`.
    async fn execute(&self, request: HttpRequest, freshness: Freshness) -> Result<HttpResponse> {
        let mut request = self.inner.pipeline.apply(request);
        let url = request.url.clone();
        let cache = &self.inner.cache;

        match request.method {
            HttpMethod::Get => {
                let cached = cache.load(&url);
                if let Some(entry) = &cached {
                    if freshness == Freshness::AllowFresh && entry.is_fresh() {
                        debug!(%url, age = ?entry.age(), "served fresh response from cache");
                        return Ok(entry.to_response());
                    }
                    entry.apply_validators(&mut request);
                }

                let response = self.transmit(request).await?;

                if response.status == 304 {
                    if let Some(mut entry) = cached {
                        debug!(%url, "not modified, serving cached body");
                        entry.revalidated(&response);
                        self.store(&entry);
                        return Ok(entry.to_response());
                    }
                    warn!(%url, "304 without a cached entry");
                }

                let response = check_status(&url, response)?;
                if let Some(entry) = CachedResponse::from_response(&url, &response) {
                    self.store(&entry);
                }
                Ok(response)
            }
            HttpMethod::Patch => {
                let response = self.transmit(request).await;
                // The resource changed (or may have): drop the stale GET entry
                if let Err(e) = cache.remove(&url) {
                    warn!(%url, error = %e, "failed to invalidate cache entry");
                }
                check_status(&url, response?)
            }
        }
    }

    async fn transmit(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method;
        let url = request.url.clone();
        debug!(method = method.as_str(), %url, "sending request");

        let response = self.inner.transport.send(request).await.map_err(|e| {
            warn!(method = method.as_str(), %url, error = %e, "request failed");
            Error::Transport(e)
        })?;

        if let Some(quota) = Quota::from_headers(&response) {
            debug!(
                status = response.status,
                remaining = quota.remaining,
                limit = quota.limit,
                reset = quota.reset,
                "received response"
            );
            if quota.is_exhausted() {
                warn!(reset = %quota.reset_at(), "rate limit exhausted");
            }
        } else {
            debug!(status = response.status, "received response");
        }
        Ok(response)
    }

    fn store(&self, entry: &CachedResponse) {
        if let Err(e) = self.inner.cache.save(entry) {
            warn!(url = %entry.url, error = %e, "failed to write cache entry");
        }
    }
}

/// Maps non-success statuses to typed errors.
fn check_status(url: &str, response: HttpResponse) -> Result<HttpResponse> {
    if response.is_success() {
        return Ok(response);
    }

    let quota = Quota::from_headers(&response);
    let retry_after = response.header("retry-after");
    let rate_limited = match response.status {
        429 => true,
        403 => {
            retry_after.is_some()
                || response
                    .header("x-ratelimit-remaining")
                    .is_some_and(|v| v.trim() == "0")
        }
        _ => false,
    };

    if rate_limited {
        warn!(%url, status = response.status, retry_after, "rate limited");
        // Secondary limits keep quota left; Retry-After is the real wait
        let reset = retry_after
            .and_then(|v| retry_after_reset(v, Utc::now()))
            .or(quota.map(|q| q.reset))
            .or_else(|| {
                response
                    .header("x-ratelimit-reset")
                    .and_then(|v| v.trim().parse().ok())
            });
        return Err(Error::RateLimited {
            remaining: quota.map(|q| q.remaining),
            limit: quota.map(|q| q.limit),
            reset,
        });
    }

    if response.status == 404 {
        debug!(%url, "not found");
        return Err(Error::NotFound {
            url: url.to_string(),
        });
    }

    Err(Error::Api {
        status: response.status,
        message: error_message(&response),
    })
}

/// Turns a `Retry-After` value (delay in seconds or an HTTP date) into a
/// Unix timestamp.
fn retry_after_reset(value: &str, now: DateTime<Utc>) -> Option<i64> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u32>() {
        return Some(now.timestamp() + i64::from(seconds));
    }
    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|date| date.timestamp())
}

/// Extracts the `message` field of a GitHub error body, or the raw body.
fn error_message(response: &HttpResponse) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_slice::<ErrorBody>(&response.body) {
        Ok(body) => body.message,
        Err(_) => {
            let text = String::from_utf8_lossy(&response.body).trim().to_string();
            if text.is_empty() {
                "Unknown error".to_string()
            } else {
                text
            }
        }
    }
}

fn decode<T: DeserializeOwned>(url: &str, response: &HttpResponse) -> Result<T> {
    serde_json::from_slice(&response.body).map_err(|source| {
        warn!(%url, error = %source, "failed to decode response");
        Error::Decode {
            url: url.to_string(),
            source,
        }
    })
}
