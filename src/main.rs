//! relnote - changelog helper backed by a cached GitHub API client.
//!
//! Loads the configuration, builds the client and reports the current rate
//! limit, plus the first page of closed issues for the configured repository.
//! Logs go to stderr; set `RUST_LOG=relnote_github=debug` to trace requests.

use anyhow::Context;
use relnote_config::{Config, auth::resolve_token};
use relnote_github::{RepoApiClient, is_last_page};
use secrecy::SecretString;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn build_client(config: &Config) -> anyhow::Result<RepoApiClient> {
    let token = resolve_token(config.github_token.as_deref()).await;
    if token.is_none() {
        warn!("no GitHub token found, using anonymous access (60 requests/hour)");
    }

    RepoApiClient::builder()
        .base_url(&config.api_url)
        .token(SecretString::from(token.unwrap_or_default()))
        .cache_dir(&config.cache.dir)
        .cache_capacity(config.cache.capacity_bytes)
        .timeout(config.request_timeout())
        .build()
        .context("failed to create GitHub client")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::load().context("failed to load configuration")?;
    let client = build_client(&config).await?;
    info!(api_url = %client.base_url(), authenticated = client.is_authenticated(), "client ready");

    let limits = client
        .get_rate_limit()
        .await
        .context("failed to fetch rate limit")?;
    for (bucket, quota) in limits.buckets() {
        println!(
            "{bucket:<22} {:>5}/{:<5} resets {}",
            quota.remaining,
            quota.limit,
            quota.reset_at().format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    let Some(repo) = &config.repository else {
        info!("no repository configured, set RELNOTE_REPOSITORY to list closed issues");
        return Ok(());
    };

    let issues = client
        .list_closed_issues(repo.owner(), repo.repo(), "", 1)
        .await
        .with_context(|| format!("failed to list closed issues of {repo}"))?;
    let pull_requests = issues.iter().filter(|i| i.is_pull_request()).count();
    println!(
        "{repo}: {} closed issues and {pull_requests} pull requests on page 1{}",
        issues.len() - pull_requests,
        if is_last_page(issues.len()) {
            ""
        } else {
            " (more pages available)"
        }
    );

    Ok(())
}
