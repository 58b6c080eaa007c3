#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;

use repo_dashboards::application::auth_service::{OAuthError, OAuthExchange};
use repo_dashboards::application::source_control::SourceControl;
use repo_dashboards::application::summary_service::Summarizer;
use repo_dashboards::domain::activity::{ActivityWindow, Commit, Issue, PullRequest};
use repo_dashboards::domain::identity::{Collaborator, GithubRepository, GithubUser};
use repo_dashboards::infrastructure::sqlite_store::SqliteDashboardStore;
use repo_dashboards::presentation::app_state::AppState;
use repo_dashboards::presentation::router::build_router;

pub const ALICE_TOKEN: &str = "alice-token";
pub const BOB_TOKEN: &str = "bob-token";

/// Window used by every activity request in the tests.
pub const SINCE: &str = "2024-01-01T00:00:00Z";
pub const UNTIL: &str = "2024-01-08T00:00:00Z";

/// In-process stand-in for the remote API.
///
/// Repositories named `*/broken` fail their commit fetch the way an upstream
/// HTTP 500 would.
#[derive(Default)]
pub struct FakeSourceControl {
    pub user_lookups: AtomicUsize,
    pub commit_calls: AtomicUsize,
}

fn user(login: &str, id: u64) -> GithubUser {
    GithubUser {
        login: login.to_string(),
        id,
        avatar_url: format!("https://avatars.example/{login}"),
    }
}

fn parse<T: serde::de::DeserializeOwned>(value: Value) -> anyhow::Result<T> {
    Ok(serde_json::from_value(value)?)
}

#[async_trait]
impl SourceControl for FakeSourceControl {
    async fn current_user(&self, token: &str) -> anyhow::Result<GithubUser> {
        self.user_lookups.fetch_add(1, Ordering::SeqCst);
        match token {
            ALICE_TOKEN => Ok(user("alice", 1)),
            BOB_TOKEN => Ok(user("bob", 2)),
            _ => Err(anyhow!("GitHub API returned 401 Unauthorized")),
        }
    }

    async fn list_commits(
        &self,
        _token: &str,
        owner: &str,
        repo: &str,
        _window: &ActivityWindow,
    ) -> anyhow::Result<Vec<Commit>> {
        self.commit_calls.fetch_add(1, Ordering::SeqCst);
        if repo == "broken" {
            return Err(anyhow!("GitHub API returned 500 Internal Server Error"));
        }
        parse(json!([
            {
                "sha": format!("{owner}-{repo}-1"),
                "commit": { "message": "Fix login\n\nlong body", "author": { "name": "Alice A" } },
                "author": { "login": "alice" }
            },
            {
                "sha": format!("{owner}-{repo}-2"),
                "commit": { "message": "Bump deps", "author": { "name": "Carol C" } },
                "author": { "login": "carol" }
            }
        ]))
    }

    async fn list_pulls(
        &self,
        _token: &str,
        _owner: &str,
        _repo: &str,
    ) -> anyhow::Result<Vec<PullRequest>> {
        parse(json!([
            {
                "number": 7,
                "title": "Add dashboards",
                "state": "open",
                "user": { "login": "bob" },
                "updated_at": "2024-01-03T12:00:00Z"
            },
            {
                "number": 3,
                "title": "Ancient change",
                "state": "closed",
                "user": { "login": "alice" },
                "updated_at": "2023-06-01T00:00:00Z"
            }
        ]))
    }

    async fn list_issues(
        &self,
        _token: &str,
        _owner: &str,
        _repo: &str,
        _since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Issue>> {
        parse(json!([
            {
                "number": 11,
                "title": "Crash on start",
                "state": "open",
                "user": { "login": "dave" },
                "updated_at": "2024-01-04T08:00:00Z"
            },
            {
                "number": 7,
                "title": "Add dashboards",
                "state": "open",
                "user": { "login": "bob" },
                "updated_at": "2024-01-03T12:00:00Z",
                "pull_request": { "url": "https://api.example/pulls/7" }
            }
        ]))
    }

    async fn list_repositories(&self, token: &str) -> anyhow::Result<Vec<GithubRepository>> {
        if token == BOB_TOKEN {
            return Err(anyhow!("GitHub API returned 502 Bad Gateway"));
        }
        parse(json!([
            {
                "id": 100,
                "name": "api",
                "full_name": "acme/api",
                "html_url": "https://github.com/acme/api",
                "private": false,
                "updated_at": "2024-01-05T00:00:00Z"
            }
        ]))
    }

    async fn list_collaborators(
        &self,
        _token: &str,
        owner: &str,
        repo: &str,
    ) -> anyhow::Result<Vec<Collaborator>> {
        if (owner, repo) != ("acme", "api") {
            return Err(anyhow!("GitHub API returned 404 Not Found"));
        }
        parse(json!([{ "login": "carol", "id": 3, "avatar_url": "" }]))
    }
}

/// Token endpoint fake keyed by authorization code.
pub struct FakeOAuth;

#[async_trait]
impl OAuthExchange for FakeOAuth {
    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        match code {
            "good-code" => Ok("gho_exchanged".to_string()),
            "expired-code" => Err(OAuthError::Rejected(
                "The code passed is incorrect or expired.".to_string(),
            )),
            "slow-code" => Err(OAuthError::Unreachable("timed out".to_string())),
            _ => Err(OAuthError::NotConfigured),
        }
    }
}

/// Records prompts; fails when the prompt mentions `explode`.
#[derive(Default)]
pub struct FakeSummarizer {
    pub calls: AtomicUsize,
    pub prompts: std::sync::Mutex<Vec<String>>,
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn complete(&self, _system_prompt: &str, prompt: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .map_err(|_| anyhow!("poisoned"))?
            .push(prompt.to_string());
        if prompt.contains("explode") {
            return Err(anyhow!("model overloaded"));
        }
        Ok("Busy week: one fix and one dependency bump.".to_string())
    }
}

pub struct TestApp {
    pub router: Router,
    pub source: Arc<FakeSourceControl>,
    pub summarizer: Arc<FakeSummarizer>,
}

/// Full router over an in-memory database and in-process fakes.
pub async fn build_test_app() -> TestApp {
    build_app(true).await
}

/// Same, with no summarizer configured.
pub async fn build_test_app_without_summarizer() -> TestApp {
    build_app(false).await
}

async fn build_app(with_summarizer: bool) -> TestApp {
    let source = Arc::new(FakeSourceControl::default());
    let summarizer = Arc::new(FakeSummarizer::default());
    let store = Arc::new(SqliteDashboardStore::in_memory().await.unwrap());

    let state = AppState::new(
        source.clone(),
        store,
        Arc::new(FakeOAuth),
        with_summarizer.then(|| summarizer.clone() as Arc<dyn Summarizer>),
        Duration::from_secs(300),
    );

    TestApp {
        router: build_router(Arc::new(state)),
        source,
        summarizer,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("token {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str, token: &str) -> Response<Body> {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post_json(&self, uri: &str, token: &str, body: Value) -> Response<Body> {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put_json(&self, uri: &str, token: &str, body: Value) -> Response<Body> {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Response<Body> {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Create a dashboard as `token` and return its id.
    pub async fn create_dashboard(&self, token: &str, name: &str, repos: &[&str]) -> String {
        let response = self
            .post_json(
                "/api/dashboards",
                token,
                json!({ "name": name, "repositories": repos }),
            )
            .await;
        assert_eq!(response.status(), axum::http::StatusCode::CREATED);
        body_json(response).await["id"]
            .as_str()
            .unwrap()
            .to_string()
    }
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn window_query() -> String {
    format!("since={}&until={}", urlencoding::encode(SINCE), urlencoding::encode(UNTIL))
}
