//! Configuration management for relnote.
//!
//! This crate handles loading, validating, and persisting configuration
//! from multiple sources (files, environment variables, defaults).
//!
//! # Overview
//!
//! The crate is organized into the following modules:
//!
//! - [`config`]: Core configuration struct, loading and environment overrides
//! - [`repository`]: `owner/repo` slug parsing
//! - [`auth`]: GitHub token resolution
//! - [`persistence`]: Config file discovery, reading and writing
//! - [`error`]: Error types for configuration operations
//!
//! # Configuration Sources (Priority)
//!
//! 1. Environment variables (`RELNOTE_API_URL`, `RELNOTE_GITHUB_TOKEN`,
//!    `RELNOTE_REPOSITORY`, `RELNOTE_CACHE_DIR`; `GITHUB_TOKEN` as a
//!    fallback token)
//! 2. Local config (`./relnote.json5` or `./relnote.json`)
//! 3. User config (`~/.config/relnote/config.json5` or `config.json`)
//! 4. Built-in defaults
//!
//! ```json5
//! {
//!   // Enterprise installs keep their path prefix
//!   api_url: "https://ghe.example.com/api/v3",
//!   repository: "rust-lang/rust",
//!   cache: { dir: ".relnote-http-cache", capacity_bytes: 10485760 },
//!   request_timeout_secs: 30,
//! }
//! ```
//!
//! # Token Resolution
//!
//! 1. `github_token` from config or environment
//! 2. `gh auth token` command (GitHub CLI)
//! 3. Unauthenticated (rate-limited)
//!
//! # Examples
//!
//! ```no_run
//! use relnote_config::{Config, auth::resolve_token};
//!
//! # async fn example() -> relnote_config::Result<()> {
//! let config = Config::load()?;
//! let token = resolve_token(config.github_token.as_deref()).await;
//! println!("authenticated: {}", token.is_some());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod persistence;
pub mod repository;

pub use config::{CacheConfig, Config};
pub use error::{ConfigError, Result};
pub use repository::Repository;
