//! Job configuration record persisted per reconciliation schedule.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::model::{JobStatus, SyncInterval, SyncKind, TrackedLink};

/// One reconciliation schedule: credentials for both platforms, the interval,
/// and the serialized tracked-link batch the cycle walks. Deleting the record
/// is what kills the schedule.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: String,
    pub kind: SyncKind,
    pub retail_address: String,
    pub retail_api_key: String,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub interval: SyncInterval,
    pub status: JobStatus,
    /// Opaque JSON batch of tracked links, written once at export time.
    pub links: String,
    pub created_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn tracked_links(&self) -> Result<Vec<TrackedLink>> {
        Ok(serde_json::from_str(&self.links)?)
    }
}
