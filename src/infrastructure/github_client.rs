// GitHub REST API client
use crate::application::source_control::{PAGE_SIZE, SourceControl};
use crate::domain::activity::{ActivityWindow, Commit, Issue, PullRequest};
use crate::domain::identity::{Collaborator, GithubRepository, GithubUser};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;

const ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("repo-dashboards/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct GithubClient {
    api_base: String,
    http: reqwest::Client,
}

impl GithubClient {
    pub fn new(api_base: String) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn repo_url(&self, owner: &str, repo: &str, resource: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base,
            urlencoding::encode(owner),
            urlencoding::encode(repo),
            resource
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, token: &str, url: &str) -> Result<T> {
        tracing::debug!(url, "GitHub request");

        let response = self
            .http
            .get(url)
            .header("Authorization", format!("token {}", token))
            .header("Accept", ACCEPT)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .context("Failed to send request to GitHub")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("GitHub API error: {} {}", status, body);
        }

        response
            .json::<T>()
            .await
            .context("Failed to parse GitHub response")
    }
}

fn query_timestamp(at: DateTime<Utc>) -> String {
    urlencoding::encode(&at.to_rfc3339_opts(SecondsFormat::Secs, true)).into_owned()
}

#[async_trait]
impl SourceControl for GithubClient {
    async fn current_user(&self, token: &str) -> Result<GithubUser> {
        let url = format!("{}/user", self.api_base);
        self.get_json(token, &url).await
    }

    async fn list_commits(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        window: &ActivityWindow,
    ) -> Result<Vec<Commit>> {
        let url = format!(
            "{}?since={}&until={}&per_page={}",
            self.repo_url(owner, repo, "commits"),
            query_timestamp(window.since),
            query_timestamp(window.until),
            PAGE_SIZE
        );
        self.get_json(token, &url).await
    }

    async fn list_pulls(&self, token: &str, owner: &str, repo: &str) -> Result<Vec<PullRequest>> {
        let url = format!(
            "{}?state=all&sort=updated&direction=desc&per_page={}",
            self.repo_url(owner, repo, "pulls"),
            PAGE_SIZE
        );
        self.get_json(token, &url).await
    }

    async fn list_issues(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<Issue>> {
        let url = format!(
            "{}?state=all&sort=updated&direction=desc&since={}&per_page={}",
            self.repo_url(owner, repo, "issues"),
            query_timestamp(since),
            PAGE_SIZE
        );
        self.get_json(token, &url).await
    }

    async fn list_repositories(&self, token: &str) -> Result<Vec<GithubRepository>> {
        let url = format!(
            "{}/user/repos?sort=updated&direction=desc&per_page={}",
            self.api_base, PAGE_SIZE
        );
        self.get_json(token, &url).await
    }

    async fn list_collaborators(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<Collaborator>> {
        let url = format!(
            "{}?per_page={}",
            self.repo_url(owner, repo, "collaborators"),
            PAGE_SIZE
        );
        self.get_json(token, &url).await
    }
}
