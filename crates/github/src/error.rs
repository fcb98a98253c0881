//! Error types for GitHub API operations.
//!
//! This module defines the error types that can occur during GitHub API
//! interactions, including configuration, transport, rate limiting, and
//! response decoding failures.

use std::time::Duration;

use chrono::Utc;

use crate::http::HttpError;

/// Errors that can occur during GitHub API operations.
///
/// Every operation either returns a complete value or exactly one of these
/// errors. The client never retries on its own.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The client could not be configured.
    ///
    /// This covers an unparsable base URL, a cache directory that cannot be
    /// created, or an HTTP client that fails to build.
    #[error("client configuration error: {reason}")]
    Configuration {
        /// A description of what is misconfigured.
        reason: String,
    },

    /// An owner, repository or number cannot be used as a URL path segment.
    ///
    /// Empty segments and the dot segments `.` and `..` would resolve to a
    /// different endpoint, so they are rejected before any request is sent.
    #[error("invalid path segment '{segment}'")]
    InvalidPathSegment {
        /// The rejected segment.
        segment: String,
    },

    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("transport error: {0}")]
    Transport(#[from] HttpError),

    /// The requested resource does not exist (HTTP 404).
    #[error("resource not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// Rate limit exceeded.
    ///
    /// GitHub answers with 429, or with 403 and either
    /// `x-ratelimit-remaining: 0` or a `Retry-After` header (secondary
    /// rate limits).
    #[error("rate limit exceeded{}", format_reset_time(*.reset))]
    RateLimited {
        /// Requests remaining in the current window, if reported.
        remaining: Option<u64>,
        /// Window size, if reported.
        limit: Option<u64>,
        /// Unix timestamp at which the window resets, if reported.
        reset: Option<i64>,
    },

    /// The response body did not match the expected shape.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        /// The URL whose body failed to decode.
        url: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The API answered with an unexpected non-success status.
    #[error("GitHub API error ({status}): {message}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The `message` field of the error body, or the raw body.
        message: String,
    },

    /// An I/O error occurred during cache operations.
    #[error("I/O error during cache operation: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns `true` for [`Error::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` for [`Error::RateLimited`].
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Time left until the rate limit window resets, for rate-limit errors
    /// that carry a reset timestamp.
    #[must_use]
    pub fn reset_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited {
                reset: Some(reset), ..
            } => Some(seconds_until(*reset)),
            _ => None,
        }
    }

    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}

fn seconds_until(reset: i64) -> Duration {
    let delta = reset - Utc::now().timestamp();
    Duration::from_secs(u64::try_from(delta).unwrap_or(0))
}

/// Formats the reset time for the rate limit error message.
fn format_reset_time(reset: Option<i64>) -> String {
    match reset {
        Some(reset) => format!(", resets at {reset}"),
        None => String::new(),
    }
}

/// A specialized Result type for GitHub API operations.
pub type Result<T> = std::result::Result<T, Error>;
