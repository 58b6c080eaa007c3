// Main entry point - Dependency injection and server setup
use std::{sync::Arc, time::Duration};

use repo_dashboards::application::summary_service::Summarizer;
use repo_dashboards::infrastructure::config::load_app_config;
use repo_dashboards::infrastructure::github_client::GithubClient;
use repo_dashboards::infrastructure::oauth_client::GithubOAuthClient;
use repo_dashboards::infrastructure::openai_client::OpenAiSummarizer;
use repo_dashboards::infrastructure::sqlite_store::SqliteDashboardStore;
use repo_dashboards::presentation::app_state::AppState;
use repo_dashboards::presentation::router::build_router;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;

    // Create adapters (infrastructure layer)
    let source_control = Arc::new(GithubClient::new(config.github.api_base.clone()));
    let store = Arc::new(
        SqliteDashboardStore::connect(&config.database.url, config.database.max_connections)
            .await?,
    );
    let oauth = Arc::new(GithubOAuthClient::new(
        config.github.oauth_token_url.clone(),
        config.github.oauth_credentials(),
    ));
    if config.github.oauth_credentials().is_none() {
        tracing::warn!("GitHub OAuth client credentials missing; code exchange disabled");
    }

    let summarizer: Option<Arc<dyn Summarizer>> = match config.summarizer.api_key() {
        Some(api_key) => Some(Arc::new(OpenAiSummarizer::new(
            config.summarizer.api_base.clone(),
            api_key.to_string(),
            config.summarizer.model.clone(),
        ))),
        None => {
            tracing::warn!("summarizer api key missing; summaries disabled");
            None
        }
    };

    // Create application state
    let state = Arc::new(AppState::new(
        source_control,
        store,
        oauth,
        summarizer,
        Duration::from_secs(config.identity.cache_ttl_secs),
    ));

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "starting repo-dashboards service");

    axum::serve(listener, router).await?;

    Ok(())
}
