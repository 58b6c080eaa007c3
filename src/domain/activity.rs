// Activity domain models - commits, pull requests and issues per repository
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Window used when the caller gives no lower bound.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Time range scoping all three activity kinds. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityWindow {
    pub since: DateTime<Utc>,
    pub until: DateTime<Utc>,
}

impl ActivityWindow {
    pub fn new(since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self { since, until }
    }

    /// Fill in missing bounds: `until` defaults to `now`, `since` to
    /// `now` minus [`DEFAULT_WINDOW_DAYS`].
    pub fn resolve(
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let until = until.unwrap_or(now);
        let since = since.unwrap_or_else(|| now - Duration::days(DEFAULT_WINDOW_DAYS));
        Self { since, until }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.since && at <= self.until
    }
}

/// A remote account reference (`author`, `user`) as returned upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    pub login: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitAuthor {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    #[serde(default)]
    pub author: Option<GitAuthor>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub commit: CommitDetail,
    /// Linked account; null when the commit email maps to no account.
    #[serde(default)]
    pub author: Option<UserRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Commit {
    pub fn author_login(&self) -> Option<&str> {
        self.author.as_ref().map(|a| a.login.as_str())
    }

    pub fn headline(&self) -> &str {
        self.commit.message.lines().next().unwrap_or_default()
    }

    /// Account login when linked, otherwise the raw git author name.
    pub fn display_author(&self) -> &str {
        match (&self.author, &self.commit.author) {
            (Some(user), _) => &user.login,
            (None, Some(git)) => &git.name,
            (None, None) => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    pub title: String,
    pub state: String,
    #[serde(default)]
    pub user: Option<UserRef>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PullRequest {
    pub fn author_login(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.login.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub title: String,
    pub state: String,
    #[serde(default)]
    pub user: Option<UserRef>,
    pub updated_at: DateTime<Utc>,
    /// Present when the upstream issues API returns a pull request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Issue {
    pub fn author_login(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.login.as_str())
    }

    pub fn is_pull_request(&self) -> bool {
        matches!(&self.pull_request, Some(marker) if !marker.is_null())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoActivity {
    pub repo_full_name: String,
    #[serde(default)]
    pub commits: Vec<Commit>,
    #[serde(default)]
    pub pulls: Vec<PullRequest>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl RepoActivity {
    pub fn empty(repo_full_name: impl Into<String>) -> Self {
        Self {
            repo_full_name: repo_full_name.into(),
            commits: Vec::new(),
            pulls: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty() && self.pulls.is_empty() && self.issues.is_empty()
    }
}

/// Aggregated activity for one dashboard: `{ repos, since, until }` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityData {
    pub repos: Vec<RepoActivity>,
    #[serde(flatten)]
    pub window: ActivityWindow,
}
