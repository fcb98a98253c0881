//! Issue and pull request records as returned by the GitHub REST API.
//!
//! These are plain deserialization targets: the client builds a fresh value
//! from every response and never mutates it afterwards. Only the fields the
//! changelog tooling reads are modelled; everything else in the payload is
//! ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A GitHub account referenced by an issue or pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The login handle (e.g., `octocat`).
    pub login: String,
    /// The profile page.
    pub html_url: String,
}

/// A label attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// The `pull_request` marker carried by issues that are pull requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestLink {
    /// API URL of the pull request.
    pub url: String,
}

/// Distinguishes plain issues from pull requests served by the issues API.
///
/// The issues endpoints return pull requests as well; those carry a
/// `pull_request` object, which is surfaced here as a separate variant so
/// callers have to handle both cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// A regular issue.
    Plain,
    /// An issue-shaped pull request.
    PullRequest(PullRequestLink),
}

/// An issue, as returned by the issues endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "IssuePayload")]
pub struct Issue {
    /// Issue number, unique per repository.
    pub number: u64,
    pub title: String,
    /// Issue body; empty when the server sends none.
    pub body: String,
    /// The author.
    pub user: User,
    /// Labels, in the order the server returned them.
    pub labels: Vec<Label>,
    /// Whether this is a plain issue or a pull request.
    pub kind: IssueKind,
}

#[derive(Deserialize)]
struct IssuePayload {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    user: User,
    #[serde(default)]
    labels: Vec<Label>,
    #[serde(default)]
    pull_request: Option<PullRequestLink>,
}

impl From<IssuePayload> for Issue {
    fn from(payload: IssuePayload) -> Self {
        Self {
            number: payload.number,
            title: payload.title,
            body: payload.body.unwrap_or_default(),
            user: payload.user,
            labels: payload.labels,
            kind: match payload.pull_request {
                Some(link) => IssueKind::PullRequest(link),
                None => IssueKind::Plain,
            },
        }
    }
}

impl Issue {
    /// Returns `true` if this issue is actually a pull request.
    #[must_use]
    pub fn is_pull_request(&self) -> bool {
        matches!(self.kind, IssueKind::PullRequest(_))
    }

    /// Returns the label names, in server order.
    #[must_use]
    pub fn label_names(&self) -> Vec<&str> {
        self.labels.iter().map(|l| l.name.as_str()).collect()
    }

    /// Returns `true` if the issue carries a label named `name`.
    #[must_use]
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name == name)
    }
}

/// A branch reference with its commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRef {
    /// Branch name.
    #[serde(rename = "ref")]
    pub name: String,
    /// Commit SHA.
    pub sha: String,
}

/// A pull request, as returned by the pulls endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    /// Description; empty when the server sends none.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
    /// Web URL of the pull request.
    pub html_url: String,
    /// When the pull request was merged; `None` if it was closed unmerged.
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
    /// The merge commit; `None` if unmerged.
    #[serde(default)]
    pub merge_commit_sha: Option<String>,
    pub head: GitRef,
    pub base: GitRef,
    pub user: User,
}

impl PullRequest {
    /// Returns `true` if the pull request was merged.
    #[must_use]
    pub fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Request body that replaces the full label set of an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueLabelsPatch {
    pub labels: Vec<String>,
}

impl IssueLabelsPatch {
    #[must_use]
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }
}
