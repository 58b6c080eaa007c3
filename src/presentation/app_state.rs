// Application state for HTTP handlers
use crate::application::activity_service::ActivityAggregator;
use crate::application::auth_service::{AuthService, OAuthExchange};
use crate::application::dashboard_service::DashboardService;
use crate::application::dashboard_store::DashboardStore;
use crate::application::identity_resolver::{IdentityCache, IdentityResolver};
use crate::application::source_control::SourceControl;
use crate::application::summary_service::{Summarizer, SummaryService};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub identity_resolver: IdentityResolver,
    pub source_control: Arc<dyn SourceControl>,
    pub dashboard_service: DashboardService,
    pub summary_service: SummaryService,
}

impl AppState {
    pub fn new(
        source_control: Arc<dyn SourceControl>,
        store: Arc<dyn DashboardStore>,
        oauth: Arc<dyn OAuthExchange>,
        summarizer: Option<Arc<dyn Summarizer>>,
        identity_ttl: Duration,
    ) -> Self {
        let identity_cache = Arc::new(IdentityCache::new(identity_ttl));
        let aggregator = ActivityAggregator::new(source_control.clone());

        Self {
            auth_service: AuthService::new(oauth),
            identity_resolver: IdentityResolver::new(source_control.clone(), identity_cache),
            source_control,
            dashboard_service: DashboardService::new(store, aggregator),
            summary_service: SummaryService::new(summarizer),
        }
    }
}
