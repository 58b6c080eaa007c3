// Repository trait for dashboard persistence
use crate::domain::dashboard::{Dashboard, DashboardUpdate, NewDashboard};
use async_trait::async_trait;
use uuid::Uuid;

/// All lookups are scoped to the owning login; a dashboard owned by someone
/// else is indistinguishable from a missing one.
#[async_trait]
pub trait DashboardStore: Send + Sync {
    /// Owner's dashboards, newest first, each with its repositories
    async fn list_for_owner(&self, owner: &str) -> anyhow::Result<Vec<Dashboard>>;

    async fn find_for_owner(&self, id: Uuid, owner: &str) -> anyhow::Result<Option<Dashboard>>;

    /// Insert the dashboard and its repositories in one transaction
    async fn create(&self, owner: &str, dashboard: &NewDashboard) -> anyhow::Result<Dashboard>;

    /// Apply a partial update in one transaction. `None` if not found/owned.
    async fn update(
        &self,
        id: Uuid,
        owner: &str,
        update: &DashboardUpdate,
    ) -> anyhow::Result<Option<Dashboard>>;

    /// `false` if not found/owned
    async fn delete(&self, id: Uuid, owner: &str) -> anyhow::Result<bool>;
}
