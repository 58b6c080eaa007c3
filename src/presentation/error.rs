// HTTP error mapping
use crate::application::auth_service::OAuthError;
use crate::application::dashboard_service::DashboardError;
use crate::application::summary_service::SummaryError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Every handler failure, rendered as `{"error": "<message>"}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Missing and not-owned are deliberately the same response.
    #[error("Not found")]
    NotFound,

    /// Server-side setup problem whose message is safe to show.
    #[error("{0}")]
    Misconfigured(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Misconfigured(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                "An internal error occurred".to_string()
            }
            other => {
                if status.is_server_error() {
                    tracing::error!(status = %status, error = %other, "request failed");
                }
                other.to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        match err {
            DashboardError::NameRequired => ApiError::BadRequest(err.to_string()),
            DashboardError::NotFound => ApiError::NotFound,
            DashboardError::Store(e) => ApiError::Internal(format!("{e:#}")),
        }
    }
}

impl From<SummaryError> for ApiError {
    fn from(err: SummaryError) -> Self {
        match err {
            SummaryError::MissingActivity
            | SummaryError::ReposNotArray
            | SummaryError::MalformedActivity(_)
            | SummaryError::MissingPeriod
            | SummaryError::InvalidPeriod(_) => ApiError::BadRequest(err.to_string()),
            SummaryError::NotConfigured => ApiError::ServiceUnavailable(err.to_string()),
            SummaryError::Upstream(msg) => ApiError::BadGateway(msg),
        }
    }
}

impl From<OAuthError> for ApiError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::MissingCode => ApiError::BadRequest(err.to_string()),
            OAuthError::NotConfigured => ApiError::Misconfigured(err.to_string()),
            OAuthError::Unreachable(_) | OAuthError::Malformed(_) => {
                ApiError::BadGateway(err.to_string())
            }
            OAuthError::Rejected(description) => ApiError::BadRequest(description),
        }
    }
}
