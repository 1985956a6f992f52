//! Run reports produced by the dispatcher and the orchestrator.
//!
//! Counts here describe *queuing* only. A queued job may still fail when a
//! worker executes it later; that outcome is never folded back into a report.

use thiserror::Error;

use crate::model::Platform;

/// A platform-level problem that stopped a platform from being processed at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformFault {
    #[error("integration lookup failed: {0}")]
    DirectoryLookup(String),
    #[error("dispatcher fault: {0}")]
    Dispatcher(String),
}

/// One integration whose sync job could not be queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueFailure {
    pub integration_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformRunReport {
    pub platform: Platform,
    pub eligible_count: usize,
    pub queued_count: usize,
    pub queue_failed_count: usize,
    pub queue_failures: Vec<QueueFailure>,
    pub fault: Option<PlatformFault>,
}

impl PlatformRunReport {
    pub fn empty(platform: Platform) -> Self {
        Self {
            platform,
            eligible_count: 0,
            queued_count: 0,
            queue_failed_count: 0,
            queue_failures: Vec::new(),
            fault: None,
        }
    }

    /// Report for a platform that could not be processed. All counts stay at zero.
    pub fn faulted(platform: Platform, fault: PlatformFault) -> Self {
        Self {
            fault: Some(fault),
            ..Self::empty(platform)
        }
    }

    pub fn record_queued(&mut self) {
        self.eligible_count += 1;
        self.queued_count += 1;
    }

    pub fn record_failure(&mut self, integration_id: impl Into<String>, reason: impl Into<String>) {
        self.eligible_count += 1;
        self.queue_failed_count += 1;
        self.queue_failures.push(QueueFailure {
            integration_id: integration_id.into(),
            reason: reason.into(),
        });
    }

    pub fn is_faulted(&self) -> bool {
        self.fault.is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.fault.is_none() && self.queue_failed_count == 0
    }

    /// Whether a CLI run of this platform alone should exit nonzero. Queue
    /// failures only count under `strict`.
    pub fn should_fail(&self, strict: bool) -> bool {
        self.is_faulted() || (strict && self.queue_failed_count > 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    PartialFailure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverallRunSummary {
    pub per_platform: Vec<PlatformRunReport>,
    pub total_queued: usize,
    pub total_failed: usize,
    pub overall_status: RunStatus,
}

impl OverallRunSummary {
    /// Aggregate reports, keeping them in the order given.
    pub fn from_reports(per_platform: Vec<PlatformRunReport>) -> Self {
        let total_queued = per_platform.iter().map(|r| r.queued_count).sum();
        let total_failed = per_platform.iter().map(|r| r.queue_failed_count).sum();
        let overall_status = if per_platform.iter().all(PlatformRunReport::is_clean) {
            RunStatus::Success
        } else {
            RunStatus::PartialFailure
        };
        Self {
            per_platform,
            total_queued,
            total_failed,
            overall_status,
        }
    }

    pub fn faulted_platforms(&self) -> impl Iterator<Item = &PlatformRunReport> {
        self.per_platform.iter().filter(|r| r.is_faulted())
    }

    pub fn should_fail(&self, strict: bool) -> bool {
        self.per_platform.iter().any(|r| r.should_fail(strict))
    }

    pub fn report_for(&self, platform: Platform) -> Option<&PlatformRunReport> {
        self.per_platform.iter().find(|r| r.platform == platform)
    }
}
