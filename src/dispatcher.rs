use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::directory::IntegrationDirectory;
use crate::jobs::JobDispatch;
use crate::model::{Platform, SyncTask, TenantScope};
use crate::report::{PlatformFault, PlatformRunReport};

/// Something that can run one platform's dispatch.
///
/// An `Err` (or a panic) is treated by the orchestrator as a dispatcher fault
/// for that platform only.
#[async_trait]
pub trait PlatformDispatcher: Send + Sync {
    async fn dispatch(&self, platform: Platform, scope: &TenantScope) -> Result<PlatformRunReport>;
}

/// Queues one sync job per active integration of a platform.
#[derive(Clone)]
pub struct SyncJobDispatcher {
    directory: Arc<dyn IntegrationDirectory>,
    jobs: Arc<dyn JobDispatch>,
}

impl SyncJobDispatcher {
    pub fn new(directory: Arc<dyn IntegrationDirectory>, jobs: Arc<dyn JobDispatch>) -> Self {
        Self { directory, jobs }
    }

    /// Never fails: lookup errors become a faulted report and each queue
    /// failure is recorded against its integration.
    #[instrument(skip_all, fields(platform = %platform, scope = %scope))]
    pub async fn dispatch_platform(
        &self,
        platform: Platform,
        scope: &TenantScope,
    ) -> PlatformRunReport {
        let integrations = match self.directory.list_active_integrations(platform, scope).await {
            Ok(list) => list,
            Err(err) => {
                error!(?err, "could not list integrations");
                return PlatformRunReport::faulted(
                    platform,
                    PlatformFault::DirectoryLookup(format!("{err:#}")),
                );
            }
        };

        let mut report = PlatformRunReport::empty(platform);
        if integrations.is_empty() {
            info!("no active integrations");
            return report;
        }

        for integration in &integrations {
            if integration.platform != platform
                || !integration.is_active()
                || !scope.includes(&integration.tenant_id)
            {
                debug!(
                    integration_id = %integration.id,
                    status = integration.status.as_str(),
                    "skipping ineligible integration"
                );
                continue;
            }

            let task = SyncTask::for_integration(integration);
            match self.jobs.submit(&task).await {
                Ok(()) => {
                    report.record_queued();
                    info!(
                        integration_id = %integration.id,
                        tenant_id = %integration.tenant_id,
                        "sync job queued"
                    );
                }
                Err(err) => {
                    let reason = format!("{err:#}");
                    warn!(
                        integration_id = %integration.id,
                        platform = %platform,
                        %reason,
                        "failed to queue sync job"
                    );
                    report.record_failure(integration.id.clone(), reason);
                }
            }
        }

        info!(
            eligible = report.eligible_count,
            queued = report.queued_count,
            failed = report.queue_failed_count,
            "platform dispatch finished"
        );
        report
    }
}

#[async_trait]
impl PlatformDispatcher for SyncJobDispatcher {
    async fn dispatch(&self, platform: Platform, scope: &TenantScope) -> Result<PlatformRunReport> {
        Ok(self.dispatch_platform(platform, scope).await)
    }
}
