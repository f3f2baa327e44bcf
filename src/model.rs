use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Durable cross-system linkage created once per successfully exported
/// product. Batches of these ride inside a job record as opaque JSON and are
/// never mutated after export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedLink {
    pub retail_id: String,
    pub zone_listing_id: String,
    pub zone_product_id: String,
    pub warehouse_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncKind {
    #[serde(rename = "quantity")]
    Quantity,
    #[serde(rename = "price")]
    Price,
}

impl SyncKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncKind::Quantity => "quantity",
            SyncKind::Price => "price",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "quantity" => Some(SyncKind::Quantity),
            "price" => Some(SyncKind::Price),
            _ => None,
        }
    }
}

/// Supported reconciliation intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncInterval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
}

impl SyncInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncInterval::OneMinute => "1m",
            SyncInterval::FiveMinutes => "5m",
            SyncInterval::FifteenMinutes => "15m",
            SyncInterval::OneHour => "1h",
            SyncInterval::OneDay => "1d",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(SyncInterval::OneMinute),
            "5m" => Some(SyncInterval::FiveMinutes),
            "15m" => Some(SyncInterval::FifteenMinutes),
            "1h" => Some(SyncInterval::OneHour),
            "1d" => Some(SyncInterval::OneDay),
            _ => None,
        }
    }

    pub fn duration(&self) -> Duration {
        match self {
            SyncInterval::OneMinute => Duration::from_secs(60),
            SyncInterval::FiveMinutes => Duration::from_secs(5 * 60),
            SyncInterval::FifteenMinutes => Duration::from_secs(15 * 60),
            SyncInterval::OneHour => Duration::from_secs(60 * 60),
            SyncInterval::OneDay => Duration::from_secs(24 * 60 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "disabled")]
    Disabled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Disabled => "disabled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(JobStatus::Active),
            "disabled" => Some(JobStatus::Disabled),
            _ => None,
        }
    }
}

/// Price/quantity sync settings supplied alongside an export request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSettings {
    pub quantity_sync: bool,
    pub price_sync: bool,
    pub quantity_sync_interval: Option<SyncInterval>,
    pub price_sync_interval: Option<SyncInterval>,
}

impl SyncSettings {
    /// An enabled sync dimension must carry an interval. Checked before any
    /// network call or job record is created.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.quantity_sync && self.quantity_sync_interval.is_none() {
            return Err("quantity_sync enabled without quantity_sync_interval");
        }
        if self.price_sync && self.price_sync_interval.is_none() {
            return Err("price_sync enabled without price_sync_interval");
        }
        Ok(())
    }
}

/// Filter applied to the source catalog fetch. Absent field = no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub active: Option<u8>,
    pub min_quantity: Option<i64>,
    pub groups: Option<Vec<i64>>,
}

impl ProductFilter {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(active) = self.active {
            if active > 1 {
                return Err("filter.active must be 0 or 1");
            }
        }
        if let Some(min) = self.min_quantity {
            if min < 0 {
                return Err("filter.min_quantity must be non-negative");
            }
        }
        Ok(())
    }
}

/// Why one listing in an export batch was not created. Failures never abort
/// the rest of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFailure {
    pub title: String,
    pub reason: String,
}
