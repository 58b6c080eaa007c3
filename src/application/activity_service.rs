// Activity aggregation - fetch and normalize per-repository activity for a window
use crate::application::source_control::SourceControl;
use crate::domain::activity::{ActivityData, ActivityWindow, Issue, PullRequest, RepoActivity};
use crate::domain::identity::split_full_name;
use futures::future::join_all;
use std::sync::Arc;

#[derive(Clone)]
pub struct ActivityAggregator {
    source: Arc<dyn SourceControl>,
}

impl ActivityAggregator {
    pub fn new(source: Arc<dyn SourceControl>) -> Self {
        Self { source }
    }

    /// Aggregate activity for `repositories`, preserving their order.
    ///
    /// Never fails: a slice whose fetch fails is reported as empty.
    pub async fn aggregate(
        &self,
        token: &str,
        repositories: &[String],
        window: ActivityWindow,
    ) -> ActivityData {
        let repos = join_all(
            repositories
                .iter()
                .map(|full_name| self.fetch_repo(token, full_name, &window)),
        )
        .await;

        ActivityData { repos, window }
    }

    async fn fetch_repo(
        &self,
        token: &str,
        full_name: &str,
        window: &ActivityWindow,
    ) -> RepoActivity {
        let Some((owner, repo)) = split_full_name(full_name) else {
            tracing::warn!(repo = full_name, "not an owner/name repository reference");
            return RepoActivity::empty(full_name);
        };

        let (commits, pulls, issues) = tokio::join!(
            self.source.list_commits(token, owner, repo, window),
            self.source.list_pulls(token, owner, repo),
            self.source.list_issues(token, owner, repo, window.since),
        );

        RepoActivity {
            repo_full_name: full_name.to_string(),
            commits: or_empty(full_name, "commits", commits),
            pulls: normalize_pulls(or_empty(full_name, "pulls", pulls), window),
            issues: normalize_issues(or_empty(full_name, "issues", issues), window),
        }
    }
}

fn or_empty<T>(repo: &str, kind: &str, result: anyhow::Result<Vec<T>>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(repo, kind, error = %e, "fetch failed, using empty list");
            Vec::new()
        }
    }
}

/// The pulls API cannot filter by date, so the window is applied here.
pub fn normalize_pulls(pulls: Vec<PullRequest>, window: &ActivityWindow) -> Vec<PullRequest> {
    pulls
        .into_iter()
        .filter(|pr| window.contains(pr.updated_at))
        .collect()
}

/// Drop pull requests cross-posted as issues and anything updated after `until`.
/// The lower bound is already applied upstream.
pub fn normalize_issues(issues: Vec<Issue>, window: &ActivityWindow) -> Vec<Issue> {
    issues
        .into_iter()
        .filter(|issue| !issue.is_pull_request() && issue.updated_at <= window.until)
        .collect()
}
