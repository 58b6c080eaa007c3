// Route table
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    create_dashboard, current_user, dashboard_activity, dashboard_contributors,
    dashboard_summary, delete_dashboard, get_dashboard, github_login, health_check,
    list_collaborators, list_dashboards, list_repositories, update_dashboard,
};
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/auth/github", post(github_login))
        .route("/api/user", get(current_user))
        .route("/api/repositories", get(list_repositories))
        .route(
            "/api/repositories/:owner/:repo/collaborators",
            get(list_collaborators),
        )
        .route("/api/dashboards", get(list_dashboards).post(create_dashboard))
        .route(
            "/api/dashboards/:id",
            get(get_dashboard)
                .put(update_dashboard)
                .delete(delete_dashboard),
        )
        .route("/api/dashboards/:id/activity", get(dashboard_activity))
        .route("/api/dashboards/:id/contributors", get(dashboard_contributors))
        .route("/api/dashboards/:id/summary", post(dashboard_summary))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
