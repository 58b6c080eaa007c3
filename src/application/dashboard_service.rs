// Dashboard service - owner-scoped CRUD and activity for dashboards
use crate::application::activity_service::ActivityAggregator;
use crate::application::contributors::{contributors, filter_by_contributor};
use crate::application::dashboard_store::DashboardStore;
use crate::domain::activity::{ActivityData, ActivityWindow};
use crate::domain::dashboard::{Dashboard, DashboardUpdate, NewDashboard, dedupe_repositories};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("name is required")]
    NameRequired,
    /// Missing, malformed id, or owned by someone else.
    #[error("Not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn DashboardStore>,
    aggregator: ActivityAggregator,
}

impl DashboardService {
    pub fn new(store: Arc<dyn DashboardStore>, aggregator: ActivityAggregator) -> Self {
        Self { store, aggregator }
    }

    pub async fn list(&self, owner: &str) -> Result<Vec<Dashboard>, DashboardError> {
        Ok(self.store.list_for_owner(owner).await?)
    }

    pub async fn create(
        &self,
        owner: &str,
        name: Option<&str>,
        repositories: Vec<String>,
    ) -> Result<Dashboard, DashboardError> {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(DashboardError::NameRequired)?;

        let dashboard = self
            .store
            .create(owner, &NewDashboard::new(name, repositories))
            .await?;
        tracing::info!(
            dashboard_id = %dashboard.id,
            owner,
            repositories = dashboard.repositories.len(),
            "created dashboard"
        );
        Ok(dashboard)
    }

    pub async fn get(&self, id: &str, owner: &str) -> Result<Dashboard, DashboardError> {
        let id = parse_id(id)?;
        self.store
            .find_for_owner(id, owner)
            .await?
            .ok_or(DashboardError::NotFound)
    }

    pub async fn update(
        &self,
        id: &str,
        owner: &str,
        update: DashboardUpdate,
    ) -> Result<Dashboard, DashboardError> {
        let id = parse_id(id)?;
        let update = DashboardUpdate {
            name: update
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            repositories: update.repositories.map(dedupe_repositories),
        };

        let dashboard = self
            .store
            .update(id, owner, &update)
            .await?
            .ok_or(DashboardError::NotFound)?;
        tracing::info!(dashboard_id = %id, owner, "updated dashboard");
        Ok(dashboard)
    }

    pub async fn delete(&self, id: &str, owner: &str) -> Result<(), DashboardError> {
        let id = parse_id(id)?;
        if !self.store.delete(id, owner).await? {
            return Err(DashboardError::NotFound);
        }
        tracing::info!(dashboard_id = %id, owner, "deleted dashboard");
        Ok(())
    }

    /// Aggregate the dashboard's activity with the caller's token, optionally
    /// narrowed to one contributor.
    pub async fn activity(
        &self,
        id: &str,
        owner: &str,
        token: &str,
        window: ActivityWindow,
        contributor: Option<&str>,
    ) -> Result<ActivityData, DashboardError> {
        let dashboard = self.get(id, owner).await?;
        let activity = self
            .aggregator
            .aggregate(token, &dashboard.repo_full_names(), window)
            .await;
        Ok(filter_by_contributor(activity, contributor))
    }

    pub async fn contributors(
        &self,
        id: &str,
        owner: &str,
        token: &str,
        window: ActivityWindow,
    ) -> Result<Vec<String>, DashboardError> {
        let activity = self.activity(id, owner, token, window, None).await?;
        Ok(contributors(&activity))
    }
}

fn parse_id(id: &str) -> Result<Uuid, DashboardError> {
    Uuid::parse_str(id).map_err(|_| DashboardError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_id_is_not_found() {
        assert!(matches!(parse_id("42"), Err(DashboardError::NotFound)));
        assert!(parse_id("6f1c2f7e-3a55-4c1b-9d2e-0c8f5b7a9e10").is_ok());
    }
}
