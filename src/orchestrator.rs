//! Runs platform dispatches and folds their reports into one summary.
//!
//! Every platform runs behind its own error boundary: an `Err` or a panic from
//! a dispatcher becomes a faulted report for that platform and the run carries
//! on. `run_platforms` always returns one report per requested platform, in
//! the requested order.

use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::dispatcher::{PlatformDispatcher, SyncJobDispatcher};
use crate::model::{Platform, TenantScope};
use crate::report::{OverallRunSummary, PlatformFault, PlatformRunReport};

/// Ordered table of platform → dispatcher. Registration order is run order.
#[derive(Clone, Default)]
pub struct DispatcherRegistry {
    entries: Vec<(Platform, Arc<dyn PlatformDispatcher>)>,
}

impl DispatcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// One shared `SyncJobDispatcher` serving every listed platform.
    pub fn with_sync_dispatcher(platforms: &[Platform], dispatcher: SyncJobDispatcher) -> Self {
        let shared: Arc<dyn PlatformDispatcher> = Arc::new(dispatcher);
        let mut registry = Self::new();
        for &platform in platforms {
            registry.register(platform, Arc::clone(&shared));
        }
        registry
    }

    /// Add a platform at the end, or replace its dispatcher in place.
    pub fn register(&mut self, platform: Platform, dispatcher: Arc<dyn PlatformDispatcher>) {
        match self.entries.iter_mut().find(|(p, _)| *p == platform) {
            Some(entry) => entry.1 = dispatcher,
            None => self.entries.push((platform, dispatcher)),
        }
    }

    pub fn get(&self, platform: Platform) -> Option<Arc<dyn PlatformDispatcher>> {
        self.entries
            .iter()
            .find(|(p, _)| *p == platform)
            .map(|(_, d)| Arc::clone(d))
    }

    pub fn platforms(&self) -> Vec<Platform> {
        self.entries.iter().map(|(p, _)| *p).collect()
    }
}

pub struct Orchestrator {
    registry: DispatcherRegistry,
    concurrent: bool,
}

impl Orchestrator {
    pub fn new(registry: DispatcherRegistry) -> Self {
        Self {
            registry,
            concurrent: false,
        }
    }

    /// Dispatch all platforms at once instead of one after another.
    /// Report order is unchanged.
    pub fn concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Every registered platform, in registration order.
    pub async fn run_all(&self, scope: &TenantScope) -> OverallRunSummary {
        self.run_platforms(&self.registry.platforms(), scope, |_| {})
            .await
    }

    /// Run `platforms` in the given order, calling `on_report` as each report
    /// becomes available (in concurrent mode, in order once all are done).
    #[instrument(skip_all, fields(scope = %scope, concurrent = self.concurrent))]
    pub async fn run_platforms<F>(
        &self,
        platforms: &[Platform],
        scope: &TenantScope,
        mut on_report: F,
    ) -> OverallRunSummary
    where
        F: FnMut(&PlatformRunReport),
    {
        let mut per_platform = Vec::with_capacity(platforms.len());
        if self.concurrent {
            let runs = platforms.iter().map(|&p| self.run_one(p, scope));
            for report in join_all(runs).await {
                on_report(&report);
                per_platform.push(report);
            }
        } else {
            for &platform in platforms {
                let report = self.run_one(platform, scope).await;
                on_report(&report);
                per_platform.push(report);
            }
        }

        let summary = OverallRunSummary::from_reports(per_platform);
        info!(
            platforms = summary.per_platform.len(),
            total_queued = summary.total_queued,
            total_failed = summary.total_failed,
            status = ?summary.overall_status,
            "sync run finished"
        );
        summary
    }

    async fn run_one(&self, platform: Platform, scope: &TenantScope) -> PlatformRunReport {
        let Some(dispatcher) = self.registry.get(platform) else {
            error!(%platform, "no dispatcher registered");
            return PlatformRunReport::faulted(
                platform,
                PlatformFault::Dispatcher(format!("no dispatcher registered for {platform}")),
            );
        };

        let outcome = AssertUnwindSafe(dispatcher.dispatch(platform, scope))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(report)) => report,
            Ok(Err(err)) => {
                error!(%platform, ?err, "platform dispatch failed");
                PlatformRunReport::faulted(platform, PlatformFault::Dispatcher(format!("{err:#}")))
            }
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!(%platform, %reason, "platform dispatch panicked");
                PlatformRunReport::faulted(platform, PlatformFault::Dispatcher(reason))
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}
