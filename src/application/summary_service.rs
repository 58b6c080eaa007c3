// Summary use case - render activity into a prompt and forward it to a language model
use crate::application::contributors::filter_by_contributor;
use crate::domain::activity::{ActivityData, ActivityWindow, RepoActivity};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::sync::Arc;

/// Items listed per kind in the prompt. Counts still report the full totals.
pub const MAX_ITEMS_PER_KIND: usize = 10;

pub const SYSTEM_PROMPT: &str = "You are a helpful engineering manager assistant. \
Summarize the GitHub activity data provided in a concise, readable markdown format. \
Highlight key accomplishments, notable PRs, and any patterns or concerns.";

/// Port for the external completion API.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn complete(&self, system_prompt: &str, prompt: &str) -> anyhow::Result<String>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SummaryError {
    #[error("activity is required")]
    MissingActivity,
    #[error("activity.repos must be an array")]
    ReposNotArray,
    #[error("activity is malformed: {0}")]
    MalformedActivity(String),
    #[error("since and until are required")]
    MissingPeriod,
    #[error("{0} must be an RFC 3339 timestamp")]
    InvalidPeriod(String),
    #[error("Summarizer is not configured")]
    NotConfigured,
    #[error("{0}")]
    Upstream(String),
}

/// Validated body of a summary request.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    pub activity: ActivityData,
}

impl SummaryRequest {
    /// Validate `{ activity, since, until, contributor? }`.
    ///
    /// `since`/`until` fall back to the bounds carried inside `activity`.
    pub fn from_body(body: &Value) -> Result<Self, SummaryError> {
        let activity = match body.get("activity") {
            None | Some(Value::Null) => return Err(SummaryError::MissingActivity),
            Some(activity) => activity,
        };
        let repos = match activity.get("repos") {
            Some(repos @ Value::Array(_)) => repos,
            _ => return Err(SummaryError::ReposNotArray),
        };
        let repos: Vec<RepoActivity> = serde_json::from_value(repos.clone())
            .map_err(|e| SummaryError::MalformedActivity(e.to_string()))?;

        let since = period_bound(body, activity, "since")?;
        let until = period_bound(body, activity, "until")?;

        let activity = ActivityData {
            repos,
            window: ActivityWindow::new(since, until),
        };
        let contributor = body.get("contributor").and_then(Value::as_str);

        Ok(Self {
            activity: filter_by_contributor(activity, contributor),
        })
    }
}

fn period_bound(body: &Value, activity: &Value, key: &str) -> Result<DateTime<Utc>, SummaryError> {
    let raw = body
        .get(key)
        .and_then(Value::as_str)
        .or_else(|| activity.get(key).and_then(Value::as_str))
        .ok_or(SummaryError::MissingPeriod)?;

    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| SummaryError::InvalidPeriod(key.to_string()))
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Render the deterministic markdown digest sent as the user prompt.
pub fn format_summary_prompt(dashboard_name: &str, activity: &ActivityData) -> String {
    let mut lines = vec![
        format!("# Activity Summary for \"{dashboard_name}\""),
        format!(
            "**Period:** {} to {}",
            format_timestamp(activity.window.since),
            format_timestamp(activity.window.until)
        ),
        String::new(),
    ];

    for repo in &activity.repos {
        lines.push(format!("## {}", repo.repo_full_name));
        lines.push(format!(
            "- Commits: {}, Pull Requests: {}, Issues: {}",
            repo.commits.len(),
            repo.pulls.len(),
            repo.issues.len()
        ));

        if !repo.commits.is_empty() {
            lines.push("### Recent Commits".to_string());
            for commit in repo.commits.iter().take(MAX_ITEMS_PER_KIND) {
                lines.push(format!("- {} ({})", commit.headline(), commit.display_author()));
            }
        }

        if !repo.pulls.is_empty() {
            lines.push("### Pull Requests".to_string());
            for pr in repo.pulls.iter().take(MAX_ITEMS_PER_KIND) {
                lines.push(format!(
                    "- [{}] {} by {}",
                    pr.state,
                    pr.title,
                    pr.author_login().unwrap_or_default()
                ));
            }
        }

        if !repo.issues.is_empty() {
            lines.push("### Issues".to_string());
            for issue in repo.issues.iter().take(MAX_ITEMS_PER_KIND) {
                lines.push(format!(
                    "- [{}] {} by {}",
                    issue.state,
                    issue.title,
                    issue.author_login().unwrap_or_default()
                ));
            }
        }

        lines.push(String::new());
    }

    lines.join("\n")
}

#[derive(Clone)]
pub struct SummaryService {
    summarizer: Option<Arc<dyn Summarizer>>,
}

impl SummaryService {
    pub fn new(summarizer: Option<Arc<dyn Summarizer>>) -> Self {
        Self { summarizer }
    }

    pub fn is_configured(&self) -> bool {
        self.summarizer.is_some()
    }

    /// Build the prompt and forward the model's answer verbatim. No retries.
    pub async fn summarize(
        &self,
        dashboard_name: &str,
        activity: &ActivityData,
    ) -> Result<String, SummaryError> {
        let summarizer = self.summarizer.as_ref().ok_or(SummaryError::NotConfigured)?;
        let prompt = format_summary_prompt(dashboard_name, activity);

        summarizer
            .complete(SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "summarizer call failed");
                SummaryError::Upstream(e.to_string())
            })
    }
}
