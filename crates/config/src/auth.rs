//! GitHub token resolution.
//!
//! Tokens are resolved in this order:
//!
//! 1. The configured token (config file or environment, see [`Config`])
//! 2. `gh auth token` (GitHub CLI)
//! 3. Anonymous access (`None`)
//!
//! [`Config`]: crate::Config

use tokio::process::Command;

use crate::error::{ConfigError, Result};

/// Resolves the token to authenticate with.
///
/// A configured token that is empty or only whitespace counts as absent.
/// Failures of the `gh` CLI are not fatal: they fall through to anonymous
/// access.
///
/// # Examples
///
/// ```no_run
/// use relnote_config::auth::resolve_token;
///
/// # async fn example() {
/// let token = resolve_token(Some("ghp_configured")).await;
/// assert_eq!(token.as_deref(), Some("ghp_configured"));
/// # }
/// ```
pub async fn resolve_token(configured: Option<&str>) -> Option<String> {
    if let Some(token) = configured.map(str::trim).filter(|t| !t.is_empty()) {
        return Some(token.to_string());
    }
    get_gh_token().await.ok().flatten()
}

/// Gets a token from the `gh` CLI.
///
/// # Returns
///
/// - `Ok(Some(token))` if `gh auth token` prints a token
/// - `Ok(None)` if `gh` is not installed or not logged in
///
/// # Errors
///
/// Returns an error if `gh` exists but cannot be run or exits with an
/// unexpected failure.
pub async fn get_gh_token() -> Result<Option<String>> {
    let output = match Command::new("gh").args(["auth", "token"]).output().await {
        Ok(output) => output,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::GhAuthFailed(e)),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if is_logged_out(&stderr) {
            return Ok(None);
        }
        return Err(ConfigError::GhAuthError {
            code: output.status.code(),
            stderr,
        });
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok((!token.is_empty()).then_some(token))
}

fn is_logged_out(stderr: &str) -> bool {
    let stderr = stderr.to_ascii_lowercase();
    stderr.contains("not logged in") || stderr.contains("no oauth token")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn configured_token_wins() {
        let token = resolve_token(Some("  ghp_configured \n")).await;
        assert_eq!(token, Some("ghp_configured".to_string()));
    }

    #[tokio::test]
    async fn blank_token_falls_through_without_panicking() {
        // Result depends on whether `gh` is installed and logged in here
        let token = resolve_token(Some("   ")).await;
        assert_ne!(token.as_deref(), Some(""));
    }

    #[test]
    fn logged_out_messages_are_recognised() {
        assert!(is_logged_out(
            "You are not logged into any GitHub hosts. To log in, run: gh auth login\n\
             not logged in"
        ));
        assert!(is_logged_out("no oauth token found for github.com"));
        assert!(!is_logged_out("HTTP 500"));
    }
}
