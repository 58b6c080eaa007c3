// Dashboard domain model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: Uuid,
    pub name: String,
    pub github_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub repositories: Vec<DashboardRepository>,
}

impl Dashboard {
    pub fn repo_full_names(&self) -> Vec<String> {
        self.repositories
            .iter()
            .map(|r| r.repo_full_name.clone())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRepository {
    pub id: Uuid,
    pub dashboard_id: Uuid,
    pub repo_full_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDashboard {
    pub name: String,
    pub repositories: Vec<String>,
}

impl NewDashboard {
    pub fn new(name: impl Into<String>, repositories: Vec<String>) -> Self {
        Self {
            name: name.into(),
            repositories: dedupe_repositories(repositories),
        }
    }
}

/// Partial update. `None` leaves the field untouched; `Some(vec![])` clears
/// the repository set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DashboardUpdate {
    pub name: Option<String>,
    pub repositories: Option<Vec<String>>,
}

impl DashboardUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.repositories.is_none()
    }
}

/// Trim entries, drop blanks and keep the first occurrence of each name.
pub fn dedupe_repositories(repositories: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    repositories
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty() && seen.insert(r.clone()))
        .collect()
}
