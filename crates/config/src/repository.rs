//! Repository slug parsing.
//!
//! The target repository can be written either as an `"owner/repo"` string
//! or as an `{ "owner": "...", "repo": "..." }` object. It always serializes
//! back to the short string form.
//!
//! # Examples
//!
//! ```
//! use relnote_config::Repository;
//!
//! let repo: Repository = serde_json::from_str(r#""rust-lang/rust""#).unwrap();
//! assert_eq!(repo.owner(), "rust-lang");
//!
//! let repo: Repository = serde_json::from_str(r#"{"owner": "org", "repo": "tool"}"#).unwrap();
//! assert_eq!(repo.to_string(), "org/tool");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// A GitHub repository, identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RepositoryRepr", into = "String")]
pub struct Repository {
    owner: String,
    repo: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RepositoryRepr {
    Short(String),
    Full { owner: String, repo: String },
}

impl TryFrom<RepositoryRepr> for Repository {
    type Error = ConfigError;

    fn try_from(repr: RepositoryRepr) -> Result<Self> {
        match repr {
            RepositoryRepr::Short(slug) => Self::parse_short(&slug),
            RepositoryRepr::Full { owner, repo } => Self::checked(owner.trim(), repo.trim()),
        }
    }
}

impl From<Repository> for String {
    fn from(repo: Repository) -> Self {
        repo.full_name()
    }
}

impl Repository {
    /// Creates a repository reference.
    ///
    /// # Examples
    ///
    /// ```
    /// use relnote_config::Repository;
    ///
    /// let repo = Repository::new("rust-lang", "rust");
    /// assert_eq!(repo.full_name(), "rust-lang/rust");
    /// ```
    #[must_use]
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Parses the short format `"owner/repo"`.
    ///
    /// Surrounding whitespace and a trailing `.git` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRepository`] unless the string has
    /// exactly one `/` with a non-empty part on each side.
    ///
    /// # Examples
    ///
    /// ```
    /// use relnote_config::Repository;
    ///
    /// let repo = Repository::parse_short("rust-lang/rust.git").unwrap();
    /// assert_eq!(repo.repo(), "rust");
    ///
    /// assert!(Repository::parse_short("invalid").is_err());
    /// assert!(Repository::parse_short("too/many/slashes").is_err());
    /// ```
    pub fn parse_short(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let Some((owner, repo)) = trimmed.split_once('/') else {
            return Err(ConfigError::InvalidRepository(format!(
                "expected 'owner/repo' format, got '{s}'"
            )));
        };
        if repo.contains('/') {
            return Err(ConfigError::InvalidRepository(format!(
                "expected 'owner/repo' format, got '{s}'"
            )));
        }
        let repo = repo.trim();
        Self::checked(owner.trim(), repo.strip_suffix(".git").unwrap_or(repo))
    }

    fn checked(owner: &str, repo: &str) -> Result<Self> {
        if owner.is_empty() || repo.is_empty() {
            return Err(ConfigError::InvalidRepository(format!(
                "owner and repo cannot be empty in '{owner}/{repo}'"
            )));
        }
        Ok(Self::new(owner, repo))
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Returns `"owner/repo"`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl FromStr for Repository {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_short(s)
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}
