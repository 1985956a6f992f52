use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use platform_sync::config;
use platform_sync::db;

#[derive(Debug, Parser)]
#[command(author, version, about = "Print pending sync jobs per platform")]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Show how many jobs were ever queued for this integration
    #[arg(long)]
    integration: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    let pool = db::init_pool(&cfg.database_url()).await?;
    db::run_migrations(&pool).await?;

    if let Some(id) = &args.integration {
        let total = db::count_jobs_for_integration(&pool, id).await?;
        println!("{id}: {total} job(s) queued");
        return Ok(());
    }

    let counts = db::count_pending_jobs(&pool).await?;
    if counts.is_empty() {
        println!("No pending sync jobs");
    }
    for c in &counts {
        println!("{:<14} {}", c.platform, c.pending);
    }
    Ok(())
}
