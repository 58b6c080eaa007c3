// HTTP request handlers
use crate::application::summary_service::SummaryRequest;
use crate::domain::activity::{ActivityData, ActivityWindow};
use crate::domain::dashboard::{Dashboard, DashboardUpdate};
use crate::domain::identity::{Collaborator, GithubRepository, GithubUser};
use crate::presentation::app_state::AppState;
use crate::presentation::auth::AuthUser;
use crate::presentation::error::{ApiError, ApiResult};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub code: Option<String>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Deserialize)]
pub struct CreateDashboardRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub repositories: Vec<String>,
}

#[derive(Deserialize)]
pub struct WindowQuery {
    pub since: Option<String>,
    pub until: Option<String>,
    pub contributor: Option<String>,
}

impl WindowQuery {
    fn window(&self) -> ApiResult<ActivityWindow> {
        let since = parse_bound("since", self.since.as_deref())?;
        let until = parse_bound("until", self.until.as_deref())?;
        Ok(ActivityWindow::resolve(since, until, Utc::now()))
    }
}

#[derive(Serialize)]
pub struct ContributorsResponse {
    pub contributors: Vec<String>,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

fn parse_bound(field: &str, raw: Option<&str>) -> ApiResult<Option<DateTime<Utc>>> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|_| ApiError::BadRequest(format!("Invalid {field} timestamp"))),
    }
}

fn invalid_body() -> ApiError {
    ApiError::BadRequest("Invalid request body".to_string())
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Exchange an OAuth authorization code for an access token
pub async fn github_login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(request) = body.map_err(|_| invalid_body())?;
    let access_token = state.auth_service.login(request.code.as_deref()).await?;
    Ok(Json(LoginResponse { access_token }))
}

pub async fn current_user(auth: AuthUser) -> Json<GithubUser> {
    Json(auth.user)
}

pub async fn list_repositories(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<GithubRepository>>> {
    let repositories = state
        .source_control
        .list_repositories(&auth.token)
        .await
        .map_err(|e| ApiError::BadGateway(format!("Failed to list repositories: {e}")))?;
    Ok(Json(repositories))
}

pub async fn list_collaborators(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path((owner, repo)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Collaborator>>> {
    let collaborators = state
        .source_control
        .list_collaborators(&auth.token, &owner, &repo)
        .await
        .map_err(|e| ApiError::BadGateway(format!("Failed to list collaborators: {e}")))?;
    Ok(Json(collaborators))
}

pub async fn list_dashboards(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<Dashboard>>> {
    let dashboards = state.dashboard_service.list(auth.login()).await?;
    Ok(Json(dashboards))
}

pub async fn create_dashboard(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    body: Result<Json<CreateDashboardRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Dashboard>)> {
    let Json(request) = body.map_err(|_| invalid_body())?;
    let dashboard = state
        .dashboard_service
        .create(auth.login(), request.name.as_deref(), request.repositories)
        .await?;
    Ok((StatusCode::CREATED, Json(dashboard)))
}

pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Dashboard>> {
    let dashboard = state.dashboard_service.get(&id, auth.login()).await?;
    Ok(Json(dashboard))
}

/// Partial update. Non-string `name` and non-array `repositories` are ignored.
pub async fn update_dashboard(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Dashboard>> {
    let Json(body) = body.map_err(|_| invalid_body())?;
    let fields = body.as_object().ok_or_else(invalid_body)?;

    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string);
    let repositories = fields.get("repositories").and_then(Value::as_array).map(|repos| {
        repos
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect::<Vec<_>>()
    });

    let dashboard = state
        .dashboard_service
        .update(&id, auth.login(), DashboardUpdate { name, repositories })
        .await?;
    Ok(Json(dashboard))
}

pub async fn delete_dashboard(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.dashboard_service.delete(&id, auth.login()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn dashboard_activity(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Json<ActivityData>> {
    let window = query.window()?;
    let activity = state
        .dashboard_service
        .activity(
            &id,
            auth.login(),
            &auth.token,
            window,
            query.contributor.as_deref(),
        )
        .await?;
    Ok(Json(activity))
}

pub async fn dashboard_contributors(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
    Query(query): Query<WindowQuery>,
) -> ApiResult<Json<ContributorsResponse>> {
    let window = query.window()?;
    let contributors = state
        .dashboard_service
        .contributors(&id, auth.login(), &auth.token, window)
        .await?;
    Ok(Json(ContributorsResponse { contributors }))
}

/// Summarize activity the client already fetched for this dashboard.
pub async fn dashboard_summary(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<SummaryResponse>> {
    let dashboard = state.dashboard_service.get(&id, auth.login()).await?;
    let Json(body) = body.map_err(|_| invalid_body())?;

    let request = SummaryRequest::from_body(&body)?;
    let summary = state
        .summary_service
        .summarize(&dashboard.name, &request.activity)
        .await?;
    Ok(Json(SummaryResponse { summary }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bound_accepts_rfc3339() {
        let parsed = parse_bound("since", Some("2024-03-01T10:00:00+02:00")).unwrap();
        assert_eq!(
            parsed.map(|t| t.to_rfc3339()),
            Some("2024-03-01T08:00:00+00:00".to_string())
        );
        assert_eq!(parse_bound("since", None).unwrap(), None);
        assert_eq!(parse_bound("since", Some("  ")).unwrap(), None);
    }

    #[test]
    fn test_parse_bound_rejects_garbage() {
        let err = parse_bound("until", Some("last tuesday")).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid until timestamp");
    }
}
