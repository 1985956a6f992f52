use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::db::{self, Pool};
use crate::model::SyncTask;

/// Queue that accepts sync tasks for later execution.
///
/// `Ok` means the task was accepted, never that the sync ran. Retries of the
/// sync itself are the queue consumer's business.
#[async_trait]
pub trait JobDispatch: Send + Sync {
    async fn submit(&self, task: &SyncTask) -> Result<()>;
}

/// Durable queue stored in the `sync_jobs` table.
#[derive(Debug, Clone)]
pub struct SqliteJobQueue {
    pool: Pool,
    queue: String,
    dedupe_pending: bool,
}

impl SqliteJobQueue {
    pub fn new(pool: Pool, queue: impl Into<String>) -> Self {
        Self {
            pool,
            queue: queue.into(),
            dedupe_pending: false,
        }
    }

    /// Skip inserting when the integration already has a pending job.
    pub fn with_dedupe_pending(mut self, dedupe: bool) -> Self {
        self.dedupe_pending = dedupe;
        self
    }
}

#[async_trait]
impl JobDispatch for SqliteJobQueue {
    async fn submit(&self, task: &SyncTask) -> Result<()> {
        match db::enqueue_sync_job(&self.pool, &self.queue, task, self.dedupe_pending).await? {
            Some(job_id) => debug!(%job_id, queue = %self.queue, "sync job stored"),
            None => debug!(
                integration_id = %task.integration_id,
                platform = %task.platform,
                "sync job already pending; not re-queued"
            ),
        }
        Ok(())
    }
}
