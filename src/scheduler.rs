//! Periodic trigger for reconciliation jobs.
//!
//! One tokio task per active job record. Each pass re-reads the record, so a
//! deleted record stops the loop and a disabled one skips the cycle. Cycles
//! of the same job are serialized by their loop; the engine itself takes no
//! locks, so exactly one scheduler process may own a given store.

use anyhow::{Context, Result};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

use crate::model::JobStatus;
use crate::reconcile::{self, CycleOutcome};
use crate::retail::RetailClient;
use crate::store::{self, JobRecord, Pool};
use crate::zone::ZoneClient;

/// Run one cycle for one job record. Returns `false` when the schedule is
/// over (the cycle terminated itself and the record was deleted).
#[instrument(skip_all, fields(job_id = %job.id, kind = job.kind.as_str()))]
pub async fn run_job_cycle(pool: &Pool, job: &JobRecord) -> Result<bool> {
    let links = job
        .tracked_links()
        .with_context(|| format!("job {} carries an unreadable link batch", job.id))?;
    let retail = RetailClient::new(&job.retail_address, job.retail_api_key.clone())?;
    let zone = ZoneClient::new();
    let refresh_token = job.refresh_token.as_deref().unwrap_or_default();

    match reconcile::run_cycle(job.kind, &retail, &zone, refresh_token, &links).await {
        CycleOutcome::Terminated => {
            store::delete_job(pool, &job.id).await?;
            warn!("schedule terminated itself after failed credential check; record deleted");
            Ok(false)
        }
        CycleOutcome::Completed(report) => {
            for failure in &report.failures {
                warn!(
                    retail_id = %failure.retail_id,
                    reason = %failure.reason,
                    "link not reconciled"
                );
            }
            Ok(true)
        }
    }
}

async fn run_job_loop(pool: Pool, job_id: String) -> Result<()> {
    loop {
        let Some(job) = store::get_job(&pool, &job_id).await? else {
            info!(%job_id, "job record gone; stopping schedule loop");
            return Ok(());
        };
        sleep(job.interval.duration()).await;

        // Re-read after the wait: the record may have been toggled or
        // deleted while we slept.
        let Some(job) = store::get_job(&pool, &job_id).await? else {
            info!(%job_id, "job record gone; stopping schedule loop");
            return Ok(());
        };
        if job.status == JobStatus::Disabled {
            continue;
        }
        if !run_job_cycle(&pool, &job).await? {
            return Ok(());
        }
    }
}

/// Spawn a schedule loop per active job record and wait for them. Returns
/// once every schedule has terminated (usually never for healthy jobs).
pub async fn run(pool: Pool) -> Result<()> {
    let jobs = store::list_active_jobs(&pool).await?;
    info!(jobs = jobs.len(), "scheduler starting");

    let mut handles = Vec::with_capacity(jobs.len());
    for job in jobs {
        let pool = pool.clone();
        let job_id = job.id.clone();
        handles.push(tokio::spawn(async move {
            if let Err(err) = run_job_loop(pool, job_id.clone()).await {
                error!(%job_id, ?err, "schedule loop failed");
            }
        }));
    }
    for handle in handles {
        if let Err(err) = handle.await {
            error!(?err, "schedule task panicked");
        }
    }
    Ok(())
}
