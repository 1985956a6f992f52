use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use platform_sync::config;
use platform_sync::db;
use platform_sync::directory::SqliteDirectory;
use platform_sync::dispatcher::SyncJobDispatcher;
use platform_sync::jobs::SqliteJobQueue;
use platform_sync::model::{Platform, TenantScope};
use platform_sync::orchestrator::{DispatcherRegistry, Orchestrator};
use platform_sync::output;

#[derive(Debug, Parser)]
#[command(author, version, about = "Queue platform sync jobs for active integrations")]
struct Cli {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Queue one sync job per active integration of a platform, or of every platform.
    Sync(SyncArgs),
}

#[derive(Debug, Args)]
struct SyncArgs {
    /// Platform slug (e.g. `instagram`, `meta-ads`) or `all`
    target: SyncTarget,

    /// Only sync integrations of this organization
    #[arg(long, value_parser = parse_org)]
    org: Option<String>,

    /// Exit nonzero when any sync job failed to queue
    #[arg(long)]
    strict: bool,
}

/// A present but blank `--org` is refused rather than widened to every tenant.
fn parse_org(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("organization id must not be empty; omit --org to sync all tenants".into());
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncTarget {
    All,
    Platform(Platform),
}

impl FromStr for SyncTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(SyncTarget::All);
        }
        s.parse::<Platform>()
            .map(SyncTarget::Platform)
            .map_err(|e| e.to_string())
    }
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncTarget::All => f.write_str("all"),
            SyncTarget::Platform(p) => f.write_str(p.slug()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let cfg = config::load(Some(&cli.config))?;
    cfg.ensure_dirs()?;

    let pool = db::init_pool(&cfg.database_url()).await?;
    db::run_migrations(&pool).await?;

    let Command::Sync(args) = cli.command;
    let scope = TenantScope::from_org(args.org);
    let dispatcher = SyncJobDispatcher::new(
        Arc::new(SqliteDirectory::new(pool.clone())),
        Arc::new(
            SqliteJobQueue::new(pool.clone(), cfg.sync.queue.clone())
                .with_dedupe_pending(cfg.sync.dedupe_pending),
        ),
    );

    info!(target = %args.target, %scope, "starting sync dispatch");
    println!("{}", output::render_header(&scope));

    let failed = match args.target {
        SyncTarget::Platform(platform) => {
            let report = dispatcher.dispatch_platform(platform, &scope).await;
            println!("{}", output::render_platform(&report));
            report.should_fail(args.strict)
        }
        SyncTarget::All => {
            let registry = DispatcherRegistry::with_sync_dispatcher(&cfg.sync.platforms, dispatcher);
            let orchestrator = Orchestrator::new(registry).concurrent(cfg.sync.concurrent);
            let summary = orchestrator
                .run_platforms(&cfg.sync.platforms, &scope, |report| {
                    println!("{}", output::render_platform(report))
                })
                .await;
            println!("{}", output::render_summary(&summary));
            summary.should_fail(args.strict)
        }
    };

    pool.close().await;
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_targets() {
        assert_eq!("all".parse::<SyncTarget>().unwrap(), SyncTarget::All);
        assert_eq!(
            "google-ads".parse::<SyncTarget>().unwrap(),
            SyncTarget::Platform(Platform::GoogleAds)
        );
        assert!("bebo".parse::<SyncTarget>().is_err());
    }

    #[test]
    fn parses_org_flag() {
        let cli = Cli::try_parse_from(["platform-sync", "sync", "instagram", "--org=org-7"]).unwrap();
        let Command::Sync(args) = cli.command;
        assert_eq!(args.target, SyncTarget::Platform(Platform::Instagram));
        assert_eq!(args.org.as_deref(), Some("org-7"));
        assert!(!args.strict);
    }

    #[test]
    fn blank_org_is_rejected() {
        for org in ["--org=", "--org=   "] {
            let err = Cli::try_parse_from(["platform-sync", "sync", "instagram", org]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        }
    }

    #[test]
    fn omitted_org_means_all_tenants() {
        let cli = Cli::try_parse_from(["platform-sync", "sync", "all"]).unwrap();
        let Command::Sync(args) = cli.command;
        assert_eq!(TenantScope::from_org(args.org), TenantScope::All);
    }
}
