mod common;

use common::{active, integration, RecordingJobs, StaticDirectory};
use std::sync::Arc;

use platform_sync::dispatcher::SyncJobDispatcher;
use platform_sync::model::{IntegrationStatus, Platform, TenantScope};
use platform_sync::report::PlatformFault;

fn dispatcher(directory: StaticDirectory, jobs: &RecordingJobs) -> SyncJobDispatcher {
    SyncJobDispatcher::new(Arc::new(directory), Arc::new(jobs.clone()))
}

#[tokio::test]
async fn never_submits_for_inactive_or_errored_integrations() {
    let directory = StaticDirectory::default().with(
        Platform::Instagram,
        vec![
            active("a", "org-1", Platform::Instagram),
            integration("b", "org-1", Platform::Instagram, IntegrationStatus::Inactive),
            active("c", "org-2", Platform::Instagram),
            integration("d", "org-2", Platform::Instagram, IntegrationStatus::Error),
            active("e", "org-1", Platform::Facebook),
        ],
    );
    let jobs = RecordingJobs::default();

    let report = dispatcher(directory, &jobs)
        .dispatch_platform(Platform::Instagram, &TenantScope::All)
        .await;

    assert_eq!(report.eligible_count, 2);
    assert_eq!(report.queued_count + report.queue_failed_count, 2);
    assert_eq!(jobs.submitted_ids().await, vec!["a", "c"]);
}

#[tokio::test]
async fn out_of_scope_tenants_are_skipped() {
    let directory = StaticDirectory::default().with(
        Platform::MetaAds,
        vec![
            active("a", "org-1", Platform::MetaAds),
            active("b", "org-2", Platform::MetaAds),
        ],
    );
    let jobs = RecordingJobs::default();

    let report = dispatcher(directory, &jobs)
        .dispatch_platform(Platform::MetaAds, &TenantScope::Tenant("org-2".into()))
        .await;

    assert_eq!(report.queued_count, 1);
    let submitted = jobs.submitted().await;
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].integration_id, "b");
    assert_eq!(submitted[0].tenant_id, "org-2");
    assert_eq!(submitted[0].platform, Platform::MetaAds);
}

#[tokio::test]
async fn one_failed_submission_does_not_stop_the_rest() {
    let ids = ["i1", "i2", "i3", "i4", "i5"];
    let rows = ids
        .iter()
        .map(|id| active(id, "org-1", Platform::GoogleAds))
        .collect();
    let directory = StaticDirectory::default().with(Platform::GoogleAds, rows);
    let jobs = RecordingJobs::rejecting(&["i3"]);

    let report = dispatcher(directory, &jobs)
        .dispatch_platform(Platform::GoogleAds, &TenantScope::All)
        .await;

    assert_eq!(jobs.submitted_ids().await, ids.to_vec());
    assert_eq!(report.eligible_count, 5);
    assert_eq!(report.queued_count, 4);
    assert_eq!(report.queue_failed_count, 1);
    assert_eq!(report.queue_failures.len(), 1);
    assert_eq!(report.queue_failures[0].integration_id, "i3");
    assert!(report.queue_failures[0].reason.contains("queue rejected i3"));
    assert!(report.fault.is_none());
}

#[tokio::test]
async fn empty_directory_is_not_an_error() {
    let jobs = RecordingJobs::default();
    let report = dispatcher(StaticDirectory::default(), &jobs)
        .dispatch_platform(Platform::TiktokAds, &TenantScope::All)
        .await;

    assert_eq!(report.eligible_count, 0);
    assert_eq!(report.queued_count, 0);
    assert_eq!(report.queue_failed_count, 0);
    assert!(report.fault.is_none());
    assert!(jobs.submitted().await.is_empty());
}

#[tokio::test]
async fn directory_failure_is_a_platform_fault() {
    let directory = StaticDirectory::default().broken_for(Platform::Facebook);
    let jobs = RecordingJobs::default();

    let report = dispatcher(directory, &jobs)
        .dispatch_platform(Platform::Facebook, &TenantScope::All)
        .await;

    assert_eq!(report.eligible_count, 0);
    assert_eq!(report.queued_count, 0);
    assert_eq!(report.queue_failed_count, 0);
    assert!(matches!(
        report.fault,
        Some(PlatformFault::DirectoryLookup(ref reason)) if reason.contains("storage unavailable")
    ));
    assert!(jobs.submitted().await.is_empty());
}
