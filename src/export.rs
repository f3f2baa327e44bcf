//! Listing export pipeline: source catalog → translator → destination
//! listings → tracked links → sync job registration.

use tracing::{info, instrument, warn};

use crate::error::ExportError;
use crate::model::{ExportFailure, ProductFilter, SyncSettings, TrackedLink};
use crate::retail::RetailApi;
use crate::store::{self, Pool};
use crate::zone::model::ZoneListing;
use crate::zone::{AccessToken, ZoneApi};

/// Source-side credentials, carried into the job records so scheduled cycles
/// can re-validate them.
#[derive(Debug, Clone)]
pub struct RetailCredentials {
    pub address: String,
    pub api_key: String,
}

/// Well-formed even when nothing was exported: an empty outcome is a normal
/// result, not an error.
#[derive(Debug, Default)]
pub struct ExportOutcome {
    pub exported: Vec<ZoneListing>,
    pub links: Vec<TrackedLink>,
    pub failures: Vec<ExportFailure>,
    /// Ids of the job records registered for this export (one per enabled
    /// sync dimension, empty when no product was created).
    pub job_ids: Vec<String>,
}

/// Export the source catalog, full or filtered.
#[instrument(skip_all)]
pub async fn export_catalog<R, Z>(
    retail: &R,
    zone: &Z,
    token: &AccessToken,
    refresh_token: &str,
    retail_creds: &RetailCredentials,
    filter: Option<&ProductFilter>,
    settings: &SyncSettings,
    pool: &Pool,
) -> Result<ExportOutcome, ExportError>
where
    R: RetailApi + ?Sized,
    Z: ZoneApi + ?Sized,
{
    settings.validate().map_err(ExportError::Settings)?;
    if let Some(filter) = filter {
        filter.validate().map_err(ExportError::Settings)?;
    }
    if !retail.check_login().await? {
        return Err(ExportError::AuthFailure);
    }

    let listings = retail.fetch_products(filter).await?;
    if listings.is_empty() {
        info!("source catalog returned no products; nothing to export");
        return Ok(ExportOutcome::default());
    }
    create_and_register(zone, token, refresh_token, retail_creds, listings, settings, pool).await
}

/// Export caller-supplied listings (already in destination shape). An empty
/// input batch is a validation failure, rejected before any network call.
#[instrument(skip_all)]
pub async fn export_listings<R, Z>(
    retail: &R,
    zone: &Z,
    token: &AccessToken,
    refresh_token: &str,
    retail_creds: &RetailCredentials,
    listings: Vec<ZoneListing>,
    settings: &SyncSettings,
    pool: &Pool,
) -> Result<ExportOutcome, ExportError>
where
    R: RetailApi + ?Sized,
    Z: ZoneApi + ?Sized,
{
    settings.validate().map_err(ExportError::Settings)?;
    if listings.is_empty() {
        return Err(ExportError::Settings("empty listings array"));
    }
    if !retail.check_login().await? {
        return Err(ExportError::AuthFailure);
    }
    create_and_register(zone, token, refresh_token, retail_creds, listings, settings, pool).await
}

#[allow(clippy::too_many_arguments)]
async fn create_and_register<Z>(
    zone: &Z,
    token: &AccessToken,
    refresh_token: &str,
    retail_creds: &RetailCredentials,
    listings: Vec<ZoneListing>,
    settings: &SyncSettings,
    pool: &Pool,
) -> Result<ExportOutcome, ExportError>
where
    Z: ZoneApi + ?Sized,
{
    let attempted = listings.len();
    let created = zone.create_listings(token, &listings).await?;
    info!(
        attempted,
        exported = created.exported.len(),
        failed = created.failures.len(),
        links = created.links.len(),
        "listing export finished"
    );
    for failure in &created.failures {
        warn!(title = %failure.title, reason = %failure.reason, "listing not exported");
    }

    // Schedules only make sense when at least one product came into being.
    let job_ids = if created.links.is_empty() {
        Vec::new()
    } else {
        store::create_sync_jobs(
            pool,
            settings,
            &created.links,
            &retail_creds.address,
            &retail_creds.api_key,
            token.as_str(),
            refresh_token,
        )
        .await?
    };

    Ok(ExportOutcome {
        exported: created.exported,
        links: created.links,
        failures: created.failures,
        job_ids,
    })
}
