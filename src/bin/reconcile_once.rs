use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

use zonesync::config;
use zonesync::scheduler;
use zonesync::store;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Run one reconciliation cycle for every active sync job and exit"
)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
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
    cfg.ensure_dirs()?;

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| format!("sqlite://{}/zonesync.db", cfg.app.data_dir));
    let pool = store::init_pool(&database_url).await?;
    store::run_migrations(&pool).await?;

    let jobs = store::list_active_jobs(&pool).await?;
    if jobs.is_empty() {
        info!("no active sync jobs; nothing to do");
        return Ok(());
    }

    let mut survived = 0usize;
    let mut terminated = 0usize;
    for job in &jobs {
        match scheduler::run_job_cycle(&pool, job).await {
            Ok(true) => survived += 1,
            Ok(false) => terminated += 1,
            Err(err) => warn!(job_id = %job.id, ?err, "cycle failed"),
        }
    }
    info!(total = jobs.len(), survived, terminated, "one-shot reconciliation finished");
    Ok(())
}
