use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use zonesync::config;
use zonesync::export::{self, RetailCredentials};
use zonesync::retail::RetailClient;
use zonesync::scheduler;
use zonesync::store;
use zonesync::zone::{AccessToken, ZoneClient};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Export the source catalog to the marketplace, then keep price and quantity in sync"
)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Skip the export and only run the reconciliation schedules already in
    /// the job store
    #[arg(long)]
    schedule_only: bool,
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

    if !args.schedule_only {
        let retail = RetailClient::new(&cfg.retail.address, cfg.retail.api_key.clone())?;
        let zone = ZoneClient::new();

        let Some(jwt) = zone.login(&cfg.zone.email, &cfg.zone.password).await? else {
            bail!("destination rejected the configured account credentials");
        };
        let token = AccessToken::new(jwt.access);

        let creds = RetailCredentials {
            address: cfg.retail.address.clone(),
            api_key: cfg.retail.api_key.clone(),
        };
        let outcome = export::export_catalog(
            &retail,
            &zone,
            &token,
            &jwt.refresh,
            &creds,
            cfg.filter.as_ref(),
            &cfg.sync,
            &pool,
        )
        .await?;
        info!(
            exported = outcome.exported.len(),
            failed = outcome.failures.len(),
            jobs = outcome.job_ids.len(),
            "export finished"
        );
    }

    tokio::select! {
        res = scheduler::run(pool) => res?,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }
    Ok(())
}
