use anyhow::Result;
use async_trait::async_trait;

use crate::db::{self, Pool};
use crate::model::{Integration, Platform, TenantScope};

/// Read access to connected integrations.
///
/// Implementations return only `active` integrations of `platform` within
/// `scope`. No matches is an empty vec, not an error; `Err` means the lookup
/// itself could not run.
#[async_trait]
pub trait IntegrationDirectory: Send + Sync {
    async fn list_active_integrations(
        &self,
        platform: Platform,
        scope: &TenantScope,
    ) -> Result<Vec<Integration>>;
}

/// Directory backed by the `integrations` table.
#[derive(Debug, Clone)]
pub struct SqliteDirectory {
    pool: Pool,
}

impl SqliteDirectory {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IntegrationDirectory for SqliteDirectory {
    async fn list_active_integrations(
        &self,
        platform: Platform,
        scope: &TenantScope,
    ) -> Result<Vec<Integration>> {
        db::list_active_integrations(&self.pool, platform, scope.tenant_id()).await
    }
}
