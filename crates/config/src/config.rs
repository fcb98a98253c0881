//! Core configuration struct and loading logic.
//!
//! This module provides the main [`Config`] struct which aggregates every
//! setting the relnote client needs: where the API lives, how to
//! authenticate, which repository to work on and how to cache responses.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConfigError, Result};
use crate::persistence::{find_config_file, read_config_file, write_config_file};
use crate::repository::Repository;

/// Root of the public GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Default response cache directory, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = ".relnote-http-cache";

/// Default response cache capacity (10 MiB).
pub const DEFAULT_CACHE_CAPACITY_BYTES: u64 = 10 * 1024 * 1024;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable overriding [`Config::api_url`].
pub const ENV_API_URL: &str = "RELNOTE_API_URL";
/// Environment variable overriding [`Config::github_token`].
pub const ENV_GITHUB_TOKEN: &str = "RELNOTE_GITHUB_TOKEN";
/// Token variable used when nothing else configures a token.
pub const ENV_GITHUB_TOKEN_FALLBACK: &str = "GITHUB_TOKEN";
/// Environment variable overriding [`Config::repository`].
pub const ENV_REPOSITORY: &str = "RELNOTE_REPOSITORY";
/// Environment variable overriding [`CacheConfig::dir`].
pub const ENV_CACHE_DIR: &str = "RELNOTE_CACHE_DIR";

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_DIR)
}

fn default_capacity() -> u64 {
    DEFAULT_CACHE_CAPACITY_BYTES
}

fn default_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// On-disk response cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache directory; relative paths resolve against the working directory.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    /// Total size the cache is trimmed back to, in bytes.
    #[serde(default = "default_capacity")]
    pub capacity_bytes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            capacity_bytes: default_capacity(),
        }
    }
}

/// The main configuration struct for relnote.
///
/// # Examples
///
/// ```
/// use relnote_config::{Config, Repository};
///
/// let config = Config::default();
/// assert_eq!(config.api_url, "https://api.github.com");
/// assert!(config.repository.is_none());
///
/// let config = Config {
///     repository: Some(Repository::new("rust-lang", "rust")),
///     github_token: Some("ghp_xxx".to_string()),
///     ..Config::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// API root, e.g. `https://ghe.example.com/api/v3` for enterprise installs.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// GitHub token.
    ///
    /// If not set, the token is looked up with the `gh` CLI, and requests go
    /// out anonymously when that fails too.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,

    /// Repository the tooling works on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,

    /// Response cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            github_token: None,
            repository: None,
            cache: CacheConfig::default(),
            request_timeout_secs: default_timeout(),
        }
    }
}

impl Config {
    /// Loads configuration from the default file locations and the process
    /// environment.
    ///
    /// Priority, highest first:
    ///
    /// 1. Environment variables (`RELNOTE_*`, then `GITHUB_TOKEN`)
    /// 2. Local config (`./relnote.json5` or `./relnote.json`)
    /// 3. User config (`~/.config/relnote/config.json5` or `config.json`)
    /// 4. Built-in defaults
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed,
    /// if an environment override is malformed, or if validation fails.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use relnote_config::Config;
    ///
    /// # fn example() -> relnote_config::Result<()> {
    /// let config = Config::load()?;
    /// if let Some(repo) = &config.repository {
    ///     println!("working on {repo}");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn load() -> Result<Self> {
        let mut config = match find_config_file() {
            Some(path) => read_config_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a specific file, without environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if
    /// validation fails.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = read_config_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        write_config_file(path, self)
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// Unset and empty variables leave the current value in place.
    /// `GITHUB_TOKEN` only fills in a token when none is configured, while
    /// `RELNOTE_GITHUB_TOKEN` always wins.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRepository`] if `RELNOTE_REPOSITORY` is
    /// not an `owner/repo` slug.
    ///
    /// # Examples
    ///
    /// ```
    /// use relnote_config::Config;
    ///
    /// let mut config = Config::default();
    /// config
    ///     .apply_env(|key| match key {
    ///         "RELNOTE_REPOSITORY" => Some("rust-lang/rust".to_string()),
    ///         _ => None,
    ///     })
    ///     .unwrap();
    /// assert_eq!(config.repository.unwrap().to_string(), "rust-lang/rust");
    /// ```
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = var(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(token) = var(ENV_GITHUB_TOKEN) {
            self.github_token = Some(token);
        } else if self.github_token.is_none() {
            self.github_token = var(ENV_GITHUB_TOKEN_FALLBACK);
        }
        if let Some(slug) = var(ENV_REPOSITORY) {
            self.repository = Some(slug.parse()?);
        }
        if let Some(dir) = var(ENV_CACHE_DIR) {
            self.cache.dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the API URL is not an
    /// absolute `http(s)` URL, or if the cache capacity or the request
    /// timeout is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use relnote_config::Config;
    ///
    /// let mut config = Config::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.api_url = "ftp://example.com".to_string();
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(self.api_url.trim())
            .map_err(|e| ConfigError::invalid("api_url", format!("'{}': {e}", self.api_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "api_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        if self.cache.capacity_bytes == 0 {
            return Err(ConfigError::invalid(
                "cache.capacity_bytes",
                "must be greater than zero",
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "request_timeout_secs",
                "must be greater than zero",
            ));
        }
        Ok(())
    }

    /// The per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.cache.dir, PathBuf::from(".relnote-http-cache"));
        assert_eq!(config.cache.capacity_bytes, 10 * 1024 * 1024);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_cache_section_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"cache": {"capacity_bytes": 1024}}"#).unwrap();
        assert_eq!(config.cache.capacity_bytes, 1024);
        assert_eq!(config.cache.dir, PathBuf::from(DEFAULT_CACHE_DIR));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cases = [
            (
                Config {
                    api_url: "not a url".to_string(),
                    ..Config::default()
                },
                "api_url",
            ),
            (
                Config {
                    api_url: "file:///tmp/api".to_string(),
                    ..Config::default()
                },
                "api_url",
            ),
            (
                Config {
                    cache: CacheConfig {
                        capacity_bytes: 0,
                        ..CacheConfig::default()
                    },
                    ..Config::default()
                },
                "cache.capacity_bytes",
            ),
            (
                Config {
                    request_timeout_secs: 0,
                    ..Config::default()
                },
                "request_timeout_secs",
            ),
        ];

        for (config, expected) in cases {
            match config.validate() {
                Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, expected),
                other => panic!("expected invalid {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn enterprise_url_is_valid() {
        let config = Config {
            api_url: "https://ghe.example.com/api/v3".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_overrides_every_setting() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("RELNOTE_API_URL", "https://ghe.example.com/api/v3"),
                ("RELNOTE_GITHUB_TOKEN", "ghp_env"),
                ("RELNOTE_REPOSITORY", "org/tool"),
                ("RELNOTE_CACHE_DIR", "/tmp/relnote-cache"),
            ]))
            .unwrap();

        assert_eq!(config.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.github_token.as_deref(), Some("ghp_env"));
        assert_eq!(config.repository, Some(Repository::new("org", "tool")));
        assert_eq!(config.cache.dir, PathBuf::from("/tmp/relnote-cache"));
    }

    #[test]
    fn github_token_only_fills_a_missing_token() {
        let mut config = Config {
            github_token: Some("ghp_file".to_string()),
            ..Config::default()
        };
        config
            .apply_env(env(&[("GITHUB_TOKEN", "ghp_ci")]))
            .unwrap();
        assert_eq!(config.github_token.as_deref(), Some("ghp_file"));

        let mut config = Config::default();
        config
            .apply_env(env(&[("GITHUB_TOKEN", "ghp_ci")]))
            .unwrap();
        assert_eq!(config.github_token.as_deref(), Some("ghp_ci"));

        config
            .apply_env(env(&[
                ("GITHUB_TOKEN", "ghp_ci"),
                ("RELNOTE_GITHUB_TOKEN", "ghp_relnote"),
            ]))
            .unwrap();
        assert_eq!(config.github_token.as_deref(), Some("ghp_relnote"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = Config::default();
        config
            .apply_env(env(&[("RELNOTE_API_URL", ""), ("RELNOTE_REPOSITORY", "  ")]))
            .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_env_repository_is_an_error() {
        let mut config = Config::default();
        let err = config
            .apply_env(env(&[("RELNOTE_REPOSITORY", "no-slash")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRepository(_)));
    }

    #[test]
    fn load_from_json5_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("relnote.json5");
        std::fs::write(
            &path,
            r#"
            {
                api_url: "https://ghe.example.com/api/v3",
                repository: "rust-lang/rust",
                cache: { dir: "cache", capacity_bytes: 4096 },
                request_timeout_secs: 5,
            }
            "#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url, "https://ghe.example.com/api/v3");
        assert_eq!(config.repository, Some(Repository::new("rust-lang", "rust")));
        assert_eq!(config.cache.dir, PathBuf::from("cache"));
        assert_eq!(config.cache.capacity_bytes, 4096);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert!(config.github_token.is_none());
    }

    #[test]
    fn load_from_rejects_invalid_file_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("relnote.json");
        std::fs::write(&path, r#"{"request_timeout_secs": 0}"#).unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let original = Config {
            github_token: Some("ghp_xxx".to_string()),
            repository: Some(Repository::new("owner", "repo")),
            ..Config::default()
        };

        original.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), original);
    }

    #[test]
    fn unset_optionals_are_not_serialized() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(!json.contains("github_token"));
        assert!(!json.contains("repository"));
    }
}
