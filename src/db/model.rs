//! Row models returned by repositories.
//!
//! Keep these focused on what the queries select. Filtering and counting
//! rules live in the dispatcher.

use anyhow::{anyhow, Result};

use crate::model::{Integration, IntegrationStatus, Platform};

/// One row of the `integrations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IntegrationRow {
    pub id: String,
    pub tenant_id: String,
    pub platform: String,
    pub status: String,
}

impl TryFrom<IntegrationRow> for Integration {
    type Error = anyhow::Error;

    fn try_from(row: IntegrationRow) -> Result<Self> {
        let platform: Platform = row
            .platform
            .parse()
            .map_err(|e| anyhow!("integration {}: {e}", row.id))?;
        let status = IntegrationStatus::parse_status(&row.status)
            .ok_or_else(|| anyhow!("integration {}: unknown status {}", row.id, row.status))?;
        Ok(Integration {
            id: row.id,
            platform,
            tenant_id: row.tenant_id,
            status,
        })
    }
}

/// Pending job count for one platform, as shown by `queue_inspect`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PendingJobCount {
    pub platform: String,
    pub pending: i64,
}
