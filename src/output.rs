//! Human-readable progress lines for the CLI.

use colored::Colorize;
use std::fmt::Write;

use crate::model::TenantScope;
use crate::report::{OverallRunSummary, PlatformRunReport, RunStatus};

pub fn render_header(scope: &TenantScope) -> String {
    format!("{} ({scope})", "Dispatching platform sync jobs".bold())
}

pub fn render_platform(report: &PlatformRunReport) -> String {
    let mut out = String::new();
    let name = report.platform.display_name();
    if let Some(fault) = &report.fault {
        let _ = write!(out, "{} {name}: {fault}", "✗".red());
        return out;
    }

    let mark = if report.queue_failed_count == 0 {
        "✓".green()
    } else {
        "!".yellow()
    };
    if report.eligible_count == 0 {
        let _ = write!(out, "{mark} {name}: no active integrations");
        return out;
    }
    let _ = write!(
        out,
        "{mark} {name}: {} queued, {} failed (of {} eligible)",
        report.queued_count, report.queue_failed_count, report.eligible_count
    );
    for failure in &report.queue_failures {
        let _ = write!(
            out,
            "\n    {} {}: {}",
            "↳".dimmed(),
            failure.integration_id,
            failure.reason
        );
    }
    out
}

pub fn render_summary(summary: &OverallRunSummary) -> String {
    let status = match summary.overall_status {
        RunStatus::Success => "SUCCESS".green().bold(),
        RunStatus::PartialFailure => "PARTIAL_FAILURE".red().bold(),
    };
    let faulted = summary.faulted_platforms().count();
    let mut out = format!(
        "Total: {} queued, {} failed across {} platform(s): {status}",
        summary.total_queued,
        summary.total_failed,
        summary.per_platform.len()
    );
    if faulted > 0 {
        let _ = write!(out, "\n{faulted} platform(s) could not be dispatched");
    }
    out
}
