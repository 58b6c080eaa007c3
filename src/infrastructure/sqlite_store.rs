// SQLite dashboard store
use crate::application::dashboard_store::DashboardStore;
use crate::domain::dashboard::{Dashboard, DashboardRepository, DashboardUpdate, NewDashboard};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// How long a writer waits for another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const DASHBOARD_COLUMNS: &str = "id, name, github_username, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct DashboardRow {
    id: Uuid,
    name: String,
    github_username: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct RepositoryRow {
    id: Uuid,
    dashboard_id: Uuid,
    repo_full_name: String,
}

impl DashboardRow {
    fn into_dashboard(self, repositories: Vec<DashboardRepository>) -> Dashboard {
        Dashboard {
            id: self.id,
            name: self.name,
            github_username: self.github_username,
            created_at: self.created_at,
            updated_at: self.updated_at,
            repositories,
        }
    }
}

impl From<RepositoryRow> for DashboardRepository {
    fn from(row: RepositoryRow) -> Self {
        Self {
            id: row.id,
            dashboard_id: row.dashboard_id,
            repo_full_name: row.repo_full_name,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqliteDashboardStore {
    pool: SqlitePool,
}

impl SqliteDashboardStore {
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database url {url}"))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to open database")?;

        Self::from_pool(pool).await
    }

    /// A private in-memory database. A single connection that never idles
    /// out keeps the data alive for the pool's lifetime.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("Failed to open in-memory database")?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to apply migrations")?;
        Ok(Self { pool })
    }
}

async fn find_row(
    conn: &mut SqliteConnection,
    id: Uuid,
    owner: &str,
) -> Result<Option<DashboardRow>> {
    let query =
        format!("SELECT {DASHBOARD_COLUMNS} FROM dashboards WHERE id = ? AND github_username = ?");
    Ok(sqlx::query_as::<_, DashboardRow>(&query)
        .bind(id)
        .bind(owner)
        .fetch_optional(conn)
        .await?)
}

async fn load_repositories(
    conn: &mut SqliteConnection,
    dashboard_id: Uuid,
) -> Result<Vec<DashboardRepository>> {
    let rows = sqlx::query_as::<_, RepositoryRow>(
        "SELECT id, dashboard_id, repo_full_name FROM dashboard_repositories \
         WHERE dashboard_id = ? ORDER BY position",
    )
    .bind(dashboard_id)
    .fetch_all(conn)
    .await?;
    Ok(rows.into_iter().map(DashboardRepository::from).collect())
}

async fn load_dashboard(
    conn: &mut SqliteConnection,
    id: Uuid,
    owner: &str,
) -> Result<Option<Dashboard>> {
    let Some(row) = find_row(&mut *conn, id, owner).await? else {
        return Ok(None);
    };
    let repositories = load_repositories(conn, id).await?;
    Ok(Some(row.into_dashboard(repositories)))
}

/// Duplicates within one dashboard are skipped by the unique constraint.
async fn insert_repositories(
    conn: &mut SqliteConnection,
    dashboard_id: Uuid,
    repositories: &[String],
) -> Result<()> {
    for (position, repo_full_name) in repositories.iter().enumerate() {
        sqlx::query(
            "INSERT INTO dashboard_repositories (id, dashboard_id, repo_full_name, position) \
             VALUES (?, ?, ?, ?) \
             ON CONFLICT (dashboard_id, repo_full_name) DO NOTHING",
        )
        .bind(Uuid::new_v4())
        .bind(dashboard_id)
        .bind(repo_full_name)
        .bind(position as i64)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl DashboardStore for SqliteDashboardStore {
    async fn list_for_owner(&self, owner: &str) -> Result<Vec<Dashboard>> {
        let mut conn = self.pool.acquire().await?;

        let query = format!(
            "SELECT {DASHBOARD_COLUMNS} FROM dashboards WHERE github_username = ? \
             ORDER BY julianday(created_at) DESC, rowid DESC"
        );
        let rows = sqlx::query_as::<_, DashboardRow>(&query)
            .bind(owner)
            .fetch_all(&mut *conn)
            .await?;

        let repo_rows = sqlx::query_as::<_, RepositoryRow>(
            "SELECT r.id, r.dashboard_id, r.repo_full_name FROM dashboard_repositories r \
             JOIN dashboards d ON d.id = r.dashboard_id \
             WHERE d.github_username = ? ORDER BY r.dashboard_id, r.position",
        )
        .bind(owner)
        .fetch_all(&mut *conn)
        .await?;

        let mut by_dashboard: HashMap<Uuid, Vec<DashboardRepository>> = HashMap::new();
        for repo in repo_rows {
            by_dashboard
                .entry(repo.dashboard_id)
                .or_default()
                .push(repo.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let repositories = by_dashboard.remove(&row.id).unwrap_or_default();
                row.into_dashboard(repositories)
            })
            .collect())
    }

    async fn find_for_owner(&self, id: Uuid, owner: &str) -> Result<Option<Dashboard>> {
        let mut conn = self.pool.acquire().await?;
        load_dashboard(&mut conn, id, owner).await
    }

    async fn create(&self, owner: &str, dashboard: &NewDashboard) -> Result<Dashboard> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO dashboards (id, name, github_username, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&dashboard.name)
        .bind(owner)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        insert_repositories(&mut tx, id, &dashboard.repositories).await?;

        let created = load_dashboard(&mut tx, id, owner)
            .await?
            .context("Inserted dashboard vanished inside its transaction")?;
        tx.commit().await?;
        Ok(created)
    }

    async fn update(
        &self,
        id: Uuid,
        owner: &str,
        update: &DashboardUpdate,
    ) -> Result<Option<Dashboard>> {
        let mut tx = self.pool.begin().await?;

        // Must be the first statement: takes the write lock, and the owner
        // filter is the ownership check.
        let touched_at = (!update.is_empty()).then(Utc::now);
        let result = sqlx::query(
            "UPDATE dashboards SET name = COALESCE(?, name), updated_at = COALESCE(?, updated_at) \
             WHERE id = ? AND github_username = ?",
        )
        .bind(update.name.as_deref())
        .bind(touched_at)
        .bind(id)
        .bind(owner)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        if let Some(repositories) = &update.repositories {
            sqlx::query("DELETE FROM dashboard_repositories WHERE dashboard_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_repositories(&mut tx, id, repositories).await?;
        }

        let updated = load_dashboard(&mut tx, id, owner).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, id: Uuid, owner: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM dashboards WHERE id = ? AND github_username = ?")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
