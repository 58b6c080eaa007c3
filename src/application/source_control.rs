// Port for the remote source-control API
use crate::domain::activity::{ActivityWindow, Commit, Issue, PullRequest};
use crate::domain::identity::{Collaborator, GithubRepository, GithubUser};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Page size for every list call. Only the first page is ever read.
pub const PAGE_SIZE: u32 = 100;

/// Every call is authenticated with the caller's own access token. A failed
/// request, a non-success status or a payload that is not a list all surface
/// as `Err`; callers decide whether that degrades or propagates.
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Resolve the account behind a token
    async fn current_user(&self, token: &str) -> anyhow::Result<GithubUser>;

    /// Commits in the window, filtered upstream by `since` and `until`
    async fn list_commits(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        window: &ActivityWindow,
    ) -> anyhow::Result<Vec<Commit>>;

    /// Pull requests in any state, most recently updated first (no date filter upstream)
    async fn list_pulls(&self, token: &str, owner: &str, repo: &str)
    -> anyhow::Result<Vec<PullRequest>>;

    /// Issues in any state updated at or after `since`; may include pull requests
    async fn list_issues(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Issue>>;

    /// Repositories visible to the token owner, most recently updated first
    async fn list_repositories(&self, token: &str) -> anyhow::Result<Vec<GithubRepository>>;

    async fn list_collaborators(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
    ) -> anyhow::Result<Vec<Collaborator>>;
}
