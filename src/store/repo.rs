use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::{info, instrument};
use uuid::Uuid;

use super::model::JobRecord;
use crate::model::{JobStatus, SyncInterval, SyncKind, SyncSettings, TrackedLink};

pub type Pool = SqlitePool;

pub async fn init_pool(database_url: &str) -> Result<Pool> {
    let normalized = prepare_sqlite_url(database_url);
    let pool = SqlitePool::connect(&normalized).await?;
    // Enable WAL and stricter durability.
    sqlx::query("PRAGMA journal_mode=WAL;")
        .execute(&pool)
        .await?;
    sqlx::query("PRAGMA synchronous=FULL;")
        .execute(&pool)
        .await?;
    Ok(pool)
}

/// If using a file-backed SQLite URL, expand a leading `~/` and ensure the
/// parent directory exists. Leaves in-memory URLs untouched.
fn prepare_sqlite_url(url: &str) -> String {
    if !url.starts_with("sqlite:") || url.starts_with("sqlite::memory") {
        return url.to_string();
    }

    let rest = &url["sqlite:".len()..];
    let path_with_query = rest.strip_prefix("//").unwrap_or(rest);
    let (path_part, query_part) = match path_with_query.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path_with_query, None),
    };
    if path_part.is_empty() {
        return url.to_string();
    }

    let expanded_path = if let Some(rest) = path_part.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            format!("{}/{}", home.trim_end_matches('/'), rest)
        } else {
            path_part.to_string()
        }
    } else {
        path_part.to_string()
    };

    if let Some(parent) = std::path::Path::new(&expanded_path).parent() {
        if !parent.as_os_str().is_empty() {
            let _ = std::fs::create_dir_all(parent);
        }
    }

    let mut rebuilt = String::from("sqlite://");
    rebuilt.push_str(&expanded_path);
    if let Some(q) = query_part {
        rebuilt.push('?');
        rebuilt.push_str(q);
    }
    rebuilt
}

pub async fn run_migrations(pool: &Pool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Create one job record per enabled sync dimension, sharing one serialized
/// tracked-link batch. Settings must have been validated by the caller; this
/// only serializes and inserts. Returns the created record ids.
#[instrument(skip_all)]
pub async fn create_sync_jobs(
    pool: &Pool,
    settings: &SyncSettings,
    links: &[TrackedLink],
    retail_address: &str,
    retail_api_key: &str,
    access_token: &str,
    refresh_token: &str,
) -> Result<Vec<String>> {
    let serialized_links = serde_json::to_string(links)?;
    let mut dimensions = Vec::new();
    if settings.quantity_sync {
        let interval = settings
            .quantity_sync_interval
            .ok_or_else(|| anyhow!("quantity_sync enabled without interval"))?;
        dimensions.push((SyncKind::Quantity, interval));
    }
    if settings.price_sync {
        let interval = settings
            .price_sync_interval
            .ok_or_else(|| anyhow!("price_sync enabled without interval"))?;
        dimensions.push((SyncKind::Price, interval));
    }

    let mut ids = Vec::with_capacity(dimensions.len());
    for (kind, interval) in dimensions {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO sync_jobs \
             (id, kind, retail_address, retail_api_key, access_token, refresh_token, interval, status, links) \
             VALUES (?, ?, ?, ?, ?, ?, ?, 'active', ?)",
        )
        .bind(&id)
        .bind(kind.as_str())
        .bind(retail_address)
        .bind(retail_api_key)
        .bind(access_token)
        .bind(refresh_token)
        .bind(interval.as_str())
        .bind(&serialized_links)
        .execute(pool)
        .await?;
        info!(
            job_id = %id,
            kind = kind.as_str(),
            interval = interval.as_str(),
            links = links.len(),
            "sync job registered"
        );
        ids.push(id);
    }
    Ok(ids)
}

fn record_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<JobRecord> {
    let kind_raw: String = row.get("kind");
    let interval_raw: String = row.get("interval");
    let status_raw: String = row.get("status");
    Ok(JobRecord {
        id: row.get("id"),
        kind: SyncKind::parse(&kind_raw).ok_or_else(|| anyhow!("bad job kind {kind_raw:?}"))?,
        retail_address: row.get("retail_address"),
        retail_api_key: row.get("retail_api_key"),
        access_token: row.get("access_token"),
        refresh_token: row.get("refresh_token"),
        interval: SyncInterval::parse(&interval_raw)
            .ok_or_else(|| anyhow!("bad job interval {interval_raw:?}"))?,
        status: JobStatus::parse(&status_raw)
            .ok_or_else(|| anyhow!("bad job status {status_raw:?}"))?,
        links: row.get("links"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}

const JOB_COLUMNS: &str = "id, kind, retail_address, retail_api_key, access_token, refresh_token, \
                           interval, status, links, created_at";

#[instrument(skip_all)]
pub async fn get_job(pool: &Pool, id: &str) -> Result<Option<JobRecord>> {
    let row = sqlx::query(&format!("SELECT {JOB_COLUMNS} FROM sync_jobs WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(record_from_row).transpose()
}

#[instrument(skip_all)]
pub async fn list_active_jobs(pool: &Pool) -> Result<Vec<JobRecord>> {
    let rows = sqlx::query(&format!(
        "SELECT {JOB_COLUMNS} FROM sync_jobs WHERE status = 'active' ORDER BY created_at"
    ))
    .fetch_all(pool)
    .await?;
    rows.iter().map(record_from_row).collect()
}

#[instrument(skip_all)]
pub async fn set_job_status(pool: &Pool, id: &str, status: JobStatus) -> Result<()> {
    sqlx::query("UPDATE sync_jobs SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Deleting the record is the cascade point: the owning schedule loop stops
/// the next time it re-reads the record.
#[instrument(skip_all)]
pub async fn delete_job(pool: &Pool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM sync_jobs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
