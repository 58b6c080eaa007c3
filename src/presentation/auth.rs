// Auth extractor - resolves `Authorization: token <value>` to the caller
use crate::domain::identity::GithubUser;
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::sync::Arc;

/// Caller identity plus the raw token, which is reused for upstream calls
/// made on the caller's behalf.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: GithubUser,
    pub token: String,
}

impl AuthUser {
    pub fn login(&self) -> &str {
        &self.user.login
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("token "))
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?
            .to_string();

        let user = state
            .identity_resolver
            .resolve(&token)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                ApiError::Unauthorized("Invalid token".to_string())
            })?;

        Ok(AuthUser { user, token })
    }
}
