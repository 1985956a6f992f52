#![allow(dead_code)]

use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

use platform_sync::directory::IntegrationDirectory;
use platform_sync::jobs::JobDispatch;
use platform_sync::model::{Integration, IntegrationStatus, Platform, SyncTask, TenantScope};

pub fn integration(id: &str, tenant: &str, platform: Platform, status: IntegrationStatus) -> Integration {
    Integration {
        id: id.into(),
        platform,
        tenant_id: tenant.into(),
        status,
    }
}

pub fn active(id: &str, tenant: &str, platform: Platform) -> Integration {
    integration(id, tenant, platform, IntegrationStatus::Active)
}

/// Directory that hands back whatever rows it was seeded with for a platform,
/// without filtering, so the dispatcher's own eligibility check is exercised.
#[derive(Clone, Default)]
pub struct StaticDirectory {
    rows: HashMap<Platform, Vec<Integration>>,
    broken: HashSet<Platform>,
}

impl StaticDirectory {
    pub fn with(mut self, platform: Platform, rows: Vec<Integration>) -> Self {
        self.rows.insert(platform, rows);
        self
    }

    pub fn broken_for(mut self, platform: Platform) -> Self {
        self.broken.insert(platform);
        self
    }
}

#[async_trait::async_trait]
impl IntegrationDirectory for StaticDirectory {
    async fn list_active_integrations(
        &self,
        platform: Platform,
        _scope: &TenantScope,
    ) -> Result<Vec<Integration>> {
        if self.broken.contains(&platform) {
            return Err(anyhow!("storage unavailable"));
        }
        Ok(self.rows.get(&platform).cloned().unwrap_or_default())
    }
}

/// Job queue that records every submission and rejects chosen integrations.
#[derive(Clone, Default)]
pub struct RecordingJobs {
    rejected: Arc<HashSet<String>>,
    submitted: Arc<Mutex<Vec<SyncTask>>>,
}

impl RecordingJobs {
    pub fn rejecting(ids: &[&str]) -> Self {
        Self {
            rejected: Arc::new(ids.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    pub async fn submitted(&self) -> Vec<SyncTask> {
        self.submitted.lock().await.clone()
    }

    pub async fn submitted_ids(&self) -> Vec<String> {
        self.submitted()
            .await
            .into_iter()
            .map(|t| t.integration_id)
            .collect()
    }
}

#[async_trait::async_trait]
impl JobDispatch for RecordingJobs {
    async fn submit(&self, task: &SyncTask) -> Result<()> {
        self.submitted.lock().await.push(task.clone());
        if self.rejected.contains(&task.integration_id) {
            return Err(anyhow!("queue rejected {}", task.integration_id));
        }
        Ok(())
    }
}
