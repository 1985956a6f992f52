use super::model::{IntegrationRow, PendingJobCount};
use crate::model::{Integration, IntegrationStatus, Platform, SyncTask};
use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::instrument;
use uuid::Uuid;

pub type Pool = SqlitePool;

/// Open the pool. WAL and `synchronous=FULL` are applied to every connection.
#[instrument(skip_all)]
pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let options = SqliteConnectOptions::from_str(&normalized)
        .with_context(|| format!("invalid database url {normalized}"))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Full);
    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .with_context(|| format!("failed to open database {normalized}"))?;
    Ok(pool)
}

/// If using a file-backed SQLite URL, expand a leading `~/`, ensure the parent
/// directory exists and ask SQLite to create the file. In-memory URLs pass through.
fn prepare_sqlite_url(url: &str) -> String {
    if !url.starts_with("sqlite:") || url.starts_with("sqlite::memory") {
        return url.to_string();
    }

    let rest = &url["sqlite:".len()..];
    let path_with_query = rest.strip_prefix("//").unwrap_or(rest);
    let (path_part, query_part) = match path_with_query.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path_with_query, None),
    };
    if path_part.is_empty() {
        return url.to_string();
    }

    let expanded_path = match (path_part.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => format!("{}/{}", home.trim_end_matches('/'), rest),
        _ => path_part.to_string(),
    };

    if let Some(parent) = std::path::Path::new(&expanded_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let mut rebuilt = format!("sqlite://{expanded_path}");
    match query_part {
        Some(q) if q.contains("mode=") => {
            rebuilt.push('?');
            rebuilt.push_str(q);
        }
        Some(q) => {
            rebuilt.push('?');
            rebuilt.push_str(q);
            rebuilt.push_str("&mode=rwc");
        }
        None => rebuilt.push_str("?mode=rwc"),
    }
    rebuilt
}

#[instrument(skip_all)]
pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Active integrations for one platform, optionally narrowed to one tenant.
/// Ordered by tenant then id so repeated runs queue in the same order.
#[instrument(skip_all, fields(platform = %platform))]
pub async fn list_active_integrations(
    pool: &Pool,
    platform: Platform,
    tenant_id: Option<&str>,
) -> Result<Vec<Integration>> {
    let rows: Vec<IntegrationRow> = sqlx::query_as(
        "SELECT id, tenant_id, platform, status FROM integrations \
         WHERE platform = ? AND status = ? AND (? IS NULL OR tenant_id = ?) \
         ORDER BY tenant_id, id",
    )
    .bind(platform.as_str())
    .bind(IntegrationStatus::Active.as_str())
    .bind(tenant_id)
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(Integration::try_from).collect()
}

#[instrument(skip_all)]
pub async fn upsert_integration(pool: &Pool, integration: &Integration) -> Result<()> {
    sqlx::query(
        "INSERT INTO integrations (id, tenant_id, platform, status) VALUES (?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET tenant_id = excluded.tenant_id, \
         platform = excluded.platform, status = excluded.status, updated_at = CURRENT_TIMESTAMP",
    )
    .bind(&integration.id)
    .bind(&integration.tenant_id)
    .bind(integration.platform.as_str())
    .bind(integration.status.as_str())
    .execute(pool)
    .await?;
    Ok(())
}

/// Insert a pending sync job and return its id.
///
/// With `skip_if_pending`, nothing is inserted when a pending job already exists
/// for the same integration and platform; `None` is returned in that case.
#[instrument(skip_all, fields(integration_id = %task.integration_id, platform = %task.platform))]
pub async fn enqueue_sync_job(
    pool: &Pool,
    queue: &str,
    task: &SyncTask,
    skip_if_pending: bool,
) -> Result<Option<String>> {
    let job_id = Uuid::new_v4().to_string();
    let payload = serde_json::to_string(task).context("failed to encode sync task")?;
    let result = sqlx::query(
        "INSERT INTO sync_jobs (id, queue, integration_id, tenant_id, platform, payload, status, attempt, available_at) \
         SELECT ?, ?, ?, ?, ?, ?, 'pending', 0, ? \
         WHERE NOT (? AND EXISTS (SELECT 1 FROM sync_jobs \
             WHERE integration_id = ? AND platform = ? AND status = 'pending'))",
    )
    .bind(&job_id)
    .bind(queue)
    .bind(&task.integration_id)
    .bind(&task.tenant_id)
    .bind(task.platform.as_str())
    .bind(payload)
    .bind(task.requested_at)
    .bind(skip_if_pending)
    .bind(&task.integration_id)
    .bind(task.platform.as_str())
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    Ok(Some(job_id))
}

#[instrument(skip_all)]
pub async fn count_pending_jobs(pool: &Pool) -> Result<Vec<PendingJobCount>> {
    let counts = sqlx::query_as(
        "SELECT platform, COUNT(*) AS pending FROM sync_jobs WHERE status = 'pending' \
         GROUP BY platform ORDER BY platform",
    )
    .fetch_all(pool)
    .await?;
    Ok(counts)
}

/// Every job ever queued for one integration, pending or not. Used by
/// `queue_inspect --integration` to spot duplicate submissions.
#[instrument(skip_all)]
pub async fn count_jobs_for_integration(pool: &Pool, integration_id: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sync_jobs WHERE integration_id = ?")
        .bind(integration_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
