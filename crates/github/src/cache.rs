//! On-disk HTTP response cache.
//!
//! Responses to `GET` requests are stored as JSON files under a fixed
//! directory, one file per request URL. Each entry keeps the validators the
//! server sent (`ETag`, `Last-Modified`) and its `Cache-Control` freshness
//! lifetime, so repeated runs can either skip the network entirely or ask
//! the server "has this changed?" and reuse the stored body on `304`.
//!
//! # Directory Structure
//!
//! ```text
//! .relnote-http-cache/
//! ├── 3f1c…e9.json     # sha256(url).json
//! └── 9a07…41.json
//! ```
//!
//! The directory is safe to delete at any time to force fresh fetches.
//!
//! # Examples
//!
//! ```no_run
//! use relnote_github::ResponseCache;
//!
//! # fn example() -> relnote_github::Result<()> {
//! let cache = ResponseCache::new()?;
//!
//! if let Some(entry) = cache.load("https://api.github.com/rate_limit") {
//!     println!("cached {} bytes, etag {:?}", entry.body.len(), entry.etag);
//! }
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};
use crate::http::{HttpHeaders, HttpRequest, HttpResponse};

/// Default cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = ".relnote-http-cache";

/// Default cache capacity (10 MiB).
pub const DEFAULT_CAPACITY_BYTES: u64 = 10 * 1024 * 1024;

/// Parsed `Cache-Control` response directives relevant to a private cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheDirectives {
    pub max_age: Option<u64>,
    pub no_cache: bool,
    pub no_store: bool,
}

impl CacheDirectives {
    /// Parses a `Cache-Control` header value.
    ///
    /// # Examples
    ///
    /// ```
    /// use relnote_github::cache::CacheDirectives;
    ///
    /// let d = CacheDirectives::parse("private, max-age=60, s-maxage=60");
    /// assert_eq!(d.max_age, Some(60));
    /// assert!(!d.no_store);
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let mut directives = Self::default();
        for part in value.split(',') {
            let part = part.trim();
            let (name, arg) = match part.split_once('=') {
                Some((name, arg)) => (name.trim(), Some(arg.trim().trim_matches('"'))),
                None => (part, None),
            };
            if name.eq_ignore_ascii_case("max-age") {
                directives.max_age = arg.and_then(|a| a.parse().ok());
            } else if name.eq_ignore_ascii_case("no-cache") {
                directives.no_cache = true;
            } else if name.eq_ignore_ascii_case("no-store") {
                directives.no_store = true;
            }
        }
        directives
    }

    fn from_headers(headers: &HttpHeaders) -> Self {
        crate::http::header_get(headers, "cache-control")
            .map(Self::parse)
            .unwrap_or_default()
    }
}

/// A stored response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// The request URL this entry answers.
    pub url: String,
    /// Status of the stored response (always a 2xx).
    pub status: u16,
    /// Response headers as received.
    pub headers: HttpHeaders,
    /// Response body.
    pub body: String,
    /// `ETag` validator, if the server sent one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// `Last-Modified` validator, if the server sent one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    /// Freshness lifetime in seconds from `Cache-Control: max-age`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age: Option<u64>,
    /// Set when the server asked for revalidation on every use.
    #[serde(default)]
    pub must_revalidate: bool,
    /// When this entry was stored or last revalidated.
    pub cached_at: DateTime<Utc>,
}

impl CachedResponse {
    /// Builds an entry from a response, or `None` when the response must not
    /// be stored (non-200, `no-store`, no validator and no freshness, or a
    /// body that is not UTF-8).
    #[must_use]
    pub fn from_response(url: impl Into<String>, response: &HttpResponse) -> Option<Self> {
        if response.status != 200 {
            return None;
        }
        let directives = CacheDirectives::from_headers(&response.headers);
        if directives.no_store {
            return None;
        }

        let etag = response.header("etag").map(str::to_string);
        let last_modified = response.header("last-modified").map(str::to_string);
        let max_age = directives.max_age.filter(|age| *age > 0);
        if etag.is_none() && last_modified.is_none() && max_age.is_none() {
            return None;
        }

        let body = String::from_utf8(response.body.clone()).ok()?;

        Some(Self {
            url: url.into(),
            status: response.status,
            headers: response.headers.clone(),
            body,
            etag,
            last_modified,
            max_age,
            must_revalidate: directives.no_cache,
            cached_at: Utc::now(),
        })
    }

    /// Returns the age of the entry.
    #[must_use]
    pub fn age(&self) -> Duration {
        let diff = Utc::now().signed_duration_since(self.cached_at);
        // If cached_at is in the future (clock skew), return zero
        diff.to_std().unwrap_or(Duration::ZERO)
    }

    /// Returns whether the entry can be served without contacting the server.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        if self.must_revalidate {
            return false;
        }
        match self.max_age {
            Some(max_age) => self.age() < Duration::from_secs(max_age),
            None => false,
        }
    }

    /// Returns whether the entry carries a validator for a conditional request.
    #[must_use]
    pub fn has_validator(&self) -> bool {
        self.etag.is_some() || self.last_modified.is_some()
    }

    /// Adds `If-None-Match` / `If-Modified-Since` to `request`.
    pub fn apply_validators(&self, request: &mut HttpRequest) {
        if let Some(etag) = &self.etag {
            request.set_header("If-None-Match", etag.clone());
        }
        if let Some(last_modified) = &self.last_modified {
            request.set_header("If-Modified-Since", last_modified.clone());
        }
    }

    /// Updates the entry after the server answered `304 Not Modified`.
    ///
    /// The stored body is kept; validators and freshness are taken from the
    /// `304` headers when present.
    pub fn revalidated(&mut self, not_modified: &HttpResponse) {
        if let Some(etag) = not_modified.header("etag") {
            self.etag = Some(etag.to_string());
        }
        if let Some(last_modified) = not_modified.header("last-modified") {
            self.last_modified = Some(last_modified.to_string());
        }
        if not_modified.header("cache-control").is_some() {
            let directives = CacheDirectives::from_headers(&not_modified.headers);
            self.max_age = directives.max_age.filter(|age| *age > 0);
            self.must_revalidate = directives.no_cache;
        }
        self.cached_at = Utc::now();
    }

    /// Rebuilds the response this entry stores.
    #[must_use]
    pub fn to_response(&self) -> HttpResponse {
        HttpResponse {
            status: self.status,
            headers: self.headers.clone(),
            body: self.body.clone().into_bytes(),
        }
    }
}

/// Disk-backed response cache with a byte capacity.
///
/// Safe to share between concurrent callers: writes go to a unique temporary
/// file that is renamed into place, so racing writers for the same URL
/// resolve to last-writer-wins and readers never see a torn entry.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    base_path: PathBuf,
    capacity: u64,
}

impl ResponseCache {
    /// Creates a cache in [`DEFAULT_CACHE_DIR`] with the default capacity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the directory cannot be created.
    #[instrument]
    pub fn new() -> Result<Self> {
        Self::with_path(DEFAULT_CACHE_DIR)
    }

    /// Creates a cache at a custom path with the default capacity.
    ///
    /// Creates the directory if it doesn't exist. An existing directory is
    /// reused as-is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the directory cannot be created or
    /// the path exists but is not a directory.
    pub fn with_path(base_path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_capacity(base_path, DEFAULT_CAPACITY_BYTES)
    }

    /// Creates a cache at a custom path with a custom capacity in bytes.
    ///
    /// # Errors
    ///
    /// Same as [`ResponseCache::with_path`].
    pub fn with_capacity(base_path: impl Into<PathBuf>, capacity: u64) -> Result<Self> {
        let base_path = base_path.into();
        debug!(?base_path, capacity, "opening response cache");

        if !base_path.is_dir() {
            debug!(?base_path, "creating cache directory");
            fs::create_dir_all(&base_path).map_err(|e| {
                Error::configuration(format!(
                    "failed to create cache directory {}: {e}",
                    base_path.display()
                ))
            })?;
        }

        Ok(Self {
            base_path,
            capacity,
        })
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Loads the entry for `url`.
    ///
    /// Missing, unreadable or corrupt entries are all misses; corrupt files
    /// are removed so the next store starts clean.
    #[instrument(skip(self))]
    pub fn load(&self, url: &str) -> Option<CachedResponse> {
        let path = self.entry_path(url);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("cache miss");
                return None;
            }
            Err(e) => {
                warn!(?path, error = %e, "failed to read cache entry");
                return None;
            }
        };

        match serde_json::from_str::<CachedResponse>(&content) {
            Ok(entry) if entry.url == url => {
                debug!(cached_at = %entry.cached_at, "cache hit");
                Some(entry)
            }
            Ok(_) => {
                warn!(?path, "cache entry belongs to a different url");
                None
            }
            Err(e) => {
                warn!(?path, error = %e, "discarding corrupt cache entry");
                let _ = fs::remove_file(&path);
                None
            }
        }
    }

    /// Stores `entry`, replacing any previous entry for the same URL, then
    /// trims the cache back under its capacity.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be written.
    #[instrument(skip(self, entry), fields(url = %entry.url, bytes = entry.body.len()))]
    pub fn save(&self, entry: &CachedResponse) -> Result<()> {
        let path = self.entry_path(&entry.url);
        let content = serde_json::to_vec(entry).map_err(|e| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("failed to serialize cache entry: {e}"),
            ))
        })?;

        let tmp = self.base_path.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        fs::write(&tmp, content)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(Error::Io(e));
        }
        debug!(?path, "cache entry saved");

        self.trim()
    }

    /// Removes the entry for `url`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing entry cannot be removed.
    #[instrument(skip(self))]
    pub fn remove(&self, url: &str) -> Result<()> {
        match fs::remove_file(self.entry_path(url)) {
            Ok(()) => {
                debug!("cache entry invalidated");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Total size in bytes of all stored entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory cannot be listed.
    pub fn size(&self) -> Result<u64> {
        Ok(self.entries()?.iter().map(|(_, len, _)| len).sum())
    }

    /// Deletes the oldest entries until the cache fits its capacity.
    ///
    /// # Errors
    ///
    /// Returns an error if the cache directory cannot be listed.
    pub fn trim(&self) -> Result<()> {
        let mut entries = self.entries()?;
        let mut total: u64 = entries.iter().map(|(_, len, _)| len).sum();
        if total <= self.capacity {
            return Ok(());
        }

        entries.sort_by_key(|(_, _, modified)| *modified);
        for (path, len, _) in entries {
            if total <= self.capacity {
                break;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    debug!(?path, len, "evicted cache entry");
                    total = total.saturating_sub(len);
                }
                // Already evicted by a concurrent writer
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    total = total.saturating_sub(len);
                }
                Err(e) => warn!(?path, error = %e, "failed to evict cache entry"),
            }
        }
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(PathBuf, u64, SystemTime)>> {
        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&self.base_path)? {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let Ok(meta) = dir_entry.metadata() else {
                continue;
            };
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            entries.push((path, meta.len(), modified));
        }
        Ok(entries)
    }

    /// Returns the file path for `url`: the hex SHA-256 of the URL.
    fn entry_path(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        self.base_path.join(format!("{digest:x}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const URL: &str = "https://api.github.com/repos/o/r/issues/1";

    fn create_test_cache() -> (ResponseCache, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cache = ResponseCache::with_path(temp_dir.path()).expect("Failed to create cache");
        (cache, temp_dir)
    }

    fn response(status: u16, headers: &[(&str, &str)], body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: headers
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn cache_control_parsing() {
        let d = CacheDirectives::parse("no-cache, max-age=0");
        assert!(d.no_cache);
        assert_eq!(d.max_age, Some(0));

        let d = CacheDirectives::parse("no-store");
        assert!(d.no_store);
        assert_eq!(d.max_age, None);

        let d = CacheDirectives::parse("max-age=\"30\"");
        assert_eq!(d.max_age, Some(30));

        assert_eq!(CacheDirectives::parse(""), CacheDirectives::default());
    }

    #[test]
    fn from_response_requires_validator_or_freshness() {
        assert!(CachedResponse::from_response(URL, &response(200, &[], "{}")).is_none());

        let with_etag = response(200, &[("ETag", "\"a\"")], "{}");
        let entry = CachedResponse::from_response(URL, &with_etag).unwrap();
        assert_eq!(entry.etag.as_deref(), Some("\"a\""));
        assert!(!entry.is_fresh());
        assert!(entry.has_validator());

        let with_age = response(200, &[("Cache-Control", "max-age=60")], "{}");
        let entry = CachedResponse::from_response(URL, &with_age).unwrap();
        assert!(entry.is_fresh());
        assert!(!entry.has_validator());
    }

    #[test]
    fn from_response_rejects_uncacheable() {
        let not_ok = response(404, &[("ETag", "\"a\"")], "{}");
        assert!(CachedResponse::from_response(URL, &not_ok).is_none());

        let no_store = response(200, &[("ETag", "\"a\""), ("Cache-Control", "no-store")], "{}");
        assert!(CachedResponse::from_response(URL, &no_store).is_none());
    }

    #[test]
    fn no_cache_entries_are_never_fresh() {
        let resp = response(
            200,
            &[("ETag", "\"a\""), ("Cache-Control", "no-cache, max-age=60")],
            "{}",
        );
        let entry = CachedResponse::from_response(URL, &resp).unwrap();
        assert!(!entry.is_fresh());
    }

    #[test]
    fn apply_validators_sets_conditional_headers() {
        let resp = response(
            200,
            &[
                ("ETag", "W/\"abc\""),
                ("Last-Modified", "Tue, 01 Oct 2024 10:00:00 GMT"),
            ],
            "{}",
        );
        let entry = CachedResponse::from_response(URL, &resp).unwrap();
        let mut req = HttpRequest::new(crate::http::HttpMethod::Get, URL);
        entry.apply_validators(&mut req);

        assert_eq!(req.header("if-none-match"), Some("W/\"abc\""));
        assert_eq!(
            req.header("if-modified-since"),
            Some("Tue, 01 Oct 2024 10:00:00 GMT")
        );
    }

    #[test]
    fn revalidated_keeps_body_and_updates_validators() {
        let resp = response(200, &[("ETag", "\"v1\"")], "{\"number\":1}");
        let mut entry = CachedResponse::from_response(URL, &resp).unwrap();
        entry.cached_at = Utc::now() - chrono::Duration::hours(1);

        entry.revalidated(&response(
            304,
            &[("ETag", "\"v2\""), ("Cache-Control", "max-age=60")],
            "",
        ));

        assert_eq!(entry.etag.as_deref(), Some("\"v2\""));
        assert_eq!(entry.body, "{\"number\":1}");
        assert!(entry.is_fresh());
        assert_eq!(entry.to_response().body, b"{\"number\":1}".to_vec());
    }

    #[test]
    fn load_returns_none_for_missing_entry() {
        let (cache, _temp) = create_test_cache();
        assert!(cache.load(URL).is_none());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (cache, _temp) = create_test_cache();
        let resp = response(200, &[("ETag", "\"etag123\"")], "[1,2,3]");
        let entry = CachedResponse::from_response(URL, &resp).unwrap();

        cache.save(&entry).expect("save should succeed");

        let loaded = cache.load(URL).expect("cache should exist");
        assert_eq!(loaded, entry);
        assert!(cache.load("https://api.github.com/other").is_none());
    }

    #[test]
    fn save_overwrites_existing_entry() {
        let (cache, _temp) = create_test_cache();
        let first = CachedResponse::from_response(URL, &response(200, &[("ETag", "\"1\"")], "old"))
            .unwrap();
        let second =
            CachedResponse::from_response(URL, &response(200, &[("ETag", "\"2\"")], "new"))
                .unwrap();

        cache.save(&first).expect("first save");
        cache.save(&second).expect("second save");

        let loaded = cache.load(URL).expect("entry");
        assert_eq!(loaded.body, "new");
        assert_eq!(loaded.etag.as_deref(), Some("\"2\""));
    }

    #[test]
    fn remove_invalidates_entry() {
        let (cache, _temp) = create_test_cache();
        let entry =
            CachedResponse::from_response(URL, &response(200, &[("ETag", "\"1\"")], "x")).unwrap();
        cache.save(&entry).expect("save");

        cache.remove(URL).expect("remove");
        assert!(cache.load(URL).is_none());

        // Removing a missing entry is not an error
        cache.remove(URL).expect("second remove");
    }

    #[test]
    fn corrupt_entry_is_a_miss_and_is_removed() {
        let (cache, _temp) = create_test_cache();
        let path = cache.entry_path(URL);
        fs::write(&path, "not valid json").expect("write invalid json");

        assert!(cache.load(URL).is_none());
        assert!(!path.exists());
    }

    #[test]
    fn trim_evicts_oldest_entries_over_capacity() {
        let temp = TempDir::new().expect("temp dir");
        let cache = ResponseCache::with_capacity(temp.path(), 1_500).expect("cache");
        let body = "x".repeat(600);

        for i in 0..3 {
            let url = format!("https://api.github.com/page/{i}");
            let entry =
                CachedResponse::from_response(&url, &response(200, &[("ETag", "\"e\"")], &body))
                    .unwrap();
            cache.save(&entry).expect("save");
            // Distinct modification times for deterministic eviction order
            std::thread::sleep(Duration::from_millis(20));
        }

        assert!(cache.size().unwrap() <= 1_500);
        assert!(cache.load("https://api.github.com/page/0").is_none());
        assert!(cache.load("https://api.github.com/page/2").is_some());
    }

    #[test]
    fn with_path_creates_directory() {
        let temp = TempDir::new().expect("temp dir");
        let cache_path = temp.path().join("nested").join("cache").join("path");
        assert!(!cache_path.exists());

        let cache = ResponseCache::with_path(&cache_path).expect("create cache");
        assert!(cache_path.is_dir());
        assert_eq!(cache.path(), cache_path.as_path());
        assert_eq!(cache.capacity(), DEFAULT_CAPACITY_BYTES);
    }

    #[test]
    fn with_path_accepts_existing_directory() {
        let temp = TempDir::new().expect("temp dir");
        ResponseCache::with_path(temp.path()).expect("first");
        ResponseCache::with_path(temp.path()).expect("existing directory is fine");
    }

    #[test]
    fn with_path_fails_when_path_is_a_file() {
        let temp = TempDir::new().expect("temp dir");
        let file = temp.path().join("not-a-dir");
        fs::write(&file, "x").expect("write file");

        let err = ResponseCache::with_path(&file).expect_err("file is not a cache dir");
        assert!(matches!(err, Error::Configuration { .. }));
    }
}
