//! Rate limit status.
//!
//! GitHub tracks several independent quota buckets. `GET /rate_limit`
//! reports all of them, plus a legacy top-level `rate` object that mirrors
//! the core bucket:
//!
//! ```json
//! {
//!   "resources": {
//!     "core": { "limit": 5000, "remaining": 4999, "reset": 1372700873 },
//!     "search": { "limit": 30, "remaining": 18, "reset": 1372697452 },
//!     "graphql": { "limit": 5000, "remaining": 4993, "reset": 1372700389 },
//!     "integration_manifest": { "limit": 5000, "remaining": 4999, "reset": 1551806725 }
//!   },
//!   "rate": { "limit": 5000, "remaining": 4999, "reset": 1372700873 }
//! }
//! ```
//!
//! The client never throttles on its own; callers read the snapshot and
//! decide whether to wait before issuing a burst of requests.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::http::HttpResponse;

/// One rate-limit counter.
///
/// `remaining` never exceeds `limit`: values above the limit are clamped
/// when deserialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawQuota")]
pub struct Quota {
    /// Requests allowed per window.
    pub limit: u64,
    /// Requests left in the current window.
    pub remaining: u64,
    /// Unix timestamp (seconds) at which `remaining` resets to `limit`.
    pub reset: i64,
}

#[derive(Deserialize)]
struct RawQuota {
    #[serde(default)]
    limit: u64,
    #[serde(default)]
    remaining: u64,
    #[serde(default)]
    reset: i64,
}

impl From<RawQuota> for Quota {
    fn from(raw: RawQuota) -> Self {
        Self::new(raw.limit, raw.remaining, raw.reset)
    }
}

impl Quota {
    /// Creates a quota, clamping `remaining` to `limit`.
    #[must_use]
    pub fn new(limit: u64, remaining: u64, reset: i64) -> Self {
        Self {
            limit,
            remaining: remaining.min(limit),
            reset,
        }
    }

    /// Returns `true` when no requests are left in this window.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// The reset time as a UTC timestamp.
    #[must_use]
    pub fn reset_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.reset, 0).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Time from `now` until the window resets (zero if already past).
    #[must_use]
    pub fn reset_after(&self, now: DateTime<Utc>) -> Duration {
        self.reset_at()
            .signed_duration_since(now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Reads the quota from `x-ratelimit-*` response headers.
    ///
    /// Returns `None` unless all three headers are present and numeric.
    #[must_use]
    pub fn from_headers(response: &HttpResponse) -> Option<Self> {
        let limit = response.header("x-ratelimit-limit")?.trim().parse().ok()?;
        let remaining = response
            .header("x-ratelimit-remaining")?
            .trim()
            .parse()
            .ok()?;
        let reset = response.header("x-ratelimit-reset")?.trim().parse().ok()?;
        Some(Self::new(limit, remaining, reset))
    }
}

/// Identifies a quota bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaBucket {
    /// Core REST endpoints.
    Core,
    /// Search endpoints.
    Search,
    /// The GraphQL endpoint.
    Graphql,
    /// The GitHub App manifest conversion endpoint.
    IntegrationManifest,
}

impl QuotaBucket {
    /// All buckets, in wire order.
    pub const ALL: [QuotaBucket; 4] = [
        QuotaBucket::Core,
        QuotaBucket::Search,
        QuotaBucket::Graphql,
        QuotaBucket::IntegrationManifest,
    ];

    /// The bucket's name on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Search => "search",
            Self::Graphql => "graphql",
            Self::IntegrationManifest => "integration_manifest",
        }
    }
}

impl fmt::Display for QuotaBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The per-bucket quotas.
///
/// Buckets the server omits read as a zero quota.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    #[serde(default)]
    pub core: Quota,
    #[serde(default)]
    pub search: Quota,
    #[serde(default)]
    pub graphql: Quota,
    #[serde(default)]
    pub integration_manifest: Quota,
}

/// The response of `GET /rate_limit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSnapshot {
    pub resources: Resources,
    /// Legacy single bucket, mirroring `resources.core`.
    #[serde(default)]
    pub rate: Quota,
}

impl RateLimitSnapshot {
    /// Returns the quota for `bucket`.
    #[must_use]
    pub fn bucket(&self, bucket: QuotaBucket) -> &Quota {
        match bucket {
            QuotaBucket::Core => &self.resources.core,
            QuotaBucket::Search => &self.resources.search,
            QuotaBucket::Graphql => &self.resources.graphql,
            QuotaBucket::IntegrationManifest => &self.resources.integration_manifest,
        }
    }

    /// Iterates over every bucket with its quota.
    pub fn buckets(&self) -> impl Iterator<Item = (QuotaBucket, &Quota)> + '_ {
        QuotaBucket::ALL
            .into_iter()
            .map(move |bucket| (bucket, self.bucket(bucket)))
    }

    /// The core quota, the one every endpoint used by the client counts against.
    #[must_use]
    pub fn core(&self) -> &Quota {
        &self.resources.core
    }
}
