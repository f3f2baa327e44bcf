//! Periodic reconciliation of previously exported products.
//!
//! One cycle = one job record: re-validate both credentials, then walk the
//! tracked-link batch comparing source and destination values and pushing the
//! source value on divergence. The source is always authoritative; there is
//! no conflict resolution and no retry policy: a failed call is reported as a
//! per-link failure and the batch moves on.

use tracing::{info, instrument, warn};

use crate::model::{SyncKind, TrackedLink};
use crate::retail::RetailApi;
use crate::zone::{ZoneApi, AccessToken};

/// Explicit terminate-self signal: the engine never touches scheduler or
/// store bookkeeping, it just tells its caller the schedule is dead.
#[derive(Debug)]
pub enum CycleOutcome {
    /// A credential re-check failed; the owning job record must be deleted.
    /// Zero reconciliation work was performed.
    Terminated,
    Completed(CycleReport),
}

#[derive(Debug, Default)]
pub struct CycleReport {
    pub checked: usize,
    pub updated: usize,
    pub failures: Vec<LinkFailure>,
}

/// Per-link failure detail. Failures never abort the rest of the batch.
#[derive(Debug)]
pub struct LinkFailure {
    pub retail_id: String,
    pub reason: String,
}

/// Run one reconciliation cycle over a tracked-link batch.
///
/// The refresh-token exchange doubles as the destination credential check;
/// the returned fresh access token is what the cycle runs with. Either check
/// failing (including in transit) is terminal for the schedule.
#[instrument(skip_all, fields(kind = kind.as_str(), links = links.len()))]
pub async fn run_cycle<R, Z>(
    kind: SyncKind,
    retail: &R,
    zone: &Z,
    refresh_token: &str,
    links: &[TrackedLink],
) -> CycleOutcome
where
    R: RetailApi + ?Sized,
    Z: ZoneApi + ?Sized,
{
    let retail_ok = matches!(retail.check_login().await, Ok(true));
    if !retail_ok {
        warn!("source credential re-check failed; terminating schedule");
        return CycleOutcome::Terminated;
    }
    let token = match zone.refresh_access(refresh_token).await {
        Ok(Some(token)) => token,
        _ => {
            warn!("destination token refresh failed; terminating schedule");
            return CycleOutcome::Terminated;
        }
    };

    let mut report = CycleReport::default();
    for link in links {
        report.checked += 1;
        match kind {
            SyncKind::Quantity => reconcile_quantity(retail, zone, &token, link, &mut report).await,
            SyncKind::Price => reconcile_price(retail, zone, &token, link, &mut report).await,
        }
    }
    info!(
        checked = report.checked,
        updated = report.updated,
        failed = report.failures.len(),
        "reconciliation cycle finished"
    );
    CycleOutcome::Completed(report)
}

async fn reconcile_quantity<R, Z>(
    retail: &R,
    zone: &Z,
    token: &AccessToken,
    link: &TrackedLink,
    report: &mut CycleReport,
) where
    R: RetailApi + ?Sized,
    Z: ZoneApi + ?Sized,
{
    // Missing on either side maps to the 0 sentinel, never an error.
    let source = match retail.get_product_quantity(&link.retail_id).await {
        Ok(quantity) => quantity.unwrap_or(0),
        Err(err) => {
            report.failures.push(fail(link, format!("source quantity read: {err}")));
            return;
        }
    };
    let destination = match zone
        .get_quantity(token, &link.zone_listing_id, &link.zone_product_id, &link.warehouse_id)
        .await
    {
        Ok(quantity) => quantity.unwrap_or(0),
        Err(err) => {
            report
                .failures
                .push(fail(link, format!("destination quantity read: {err}")));
            return;
        }
    };
    if source == destination {
        return;
    }

    match zone
        .update_quantity(token, &link.zone_product_id, &link.warehouse_id, source)
        .await
    {
        Ok(true) => {
            info!(retail_id = %link.retail_id, from = destination, to = source, "quantity updated");
            report.updated += 1;
        }
        Ok(false) => {
            warn!(retail_id = %link.retail_id, "destination rejected quantity update");
            report
                .failures
                .push(fail(link, "destination rejected quantity update".into()));
        }
        Err(err) => {
            report
                .failures
                .push(fail(link, format!("quantity update: {err}")));
        }
    }
}

async fn reconcile_price<R, Z>(
    retail: &R,
    zone: &Z,
    token: &AccessToken,
    link: &TrackedLink,
    report: &mut CycleReport,
) where
    R: RetailApi + ?Sized,
    Z: ZoneApi + ?Sized,
{
    let source = match retail.get_offer_price(&link.retail_id).await {
        Ok(price) => price.unwrap_or_else(|| "0".to_string()),
        Err(err) => {
            report.failures.push(fail(link, format!("source price read: {err}")));
            return;
        }
    };
    let destination = match zone
        .get_price(token, &link.zone_listing_id, &link.zone_product_id)
        .await
    {
        Ok(price) => price.unwrap_or_else(|| "0".to_string()),
        Err(err) => {
            report
                .failures
                .push(fail(link, format!("destination price read: {err}")));
            return;
        }
    };
    if source == destination {
        return;
    }

    match zone
        .update_price(token, &link.zone_listing_id, &link.zone_product_id, &source)
        .await
    {
        Ok(true) => {
            info!(retail_id = %link.retail_id, from = %destination, to = %source, "price updated");
            report.updated += 1;
        }
        Ok(false) => {
            warn!(retail_id = %link.retail_id, "destination rejected price update");
            report
                .failures
                .push(fail(link, "destination rejected price update".into()));
        }
        Err(err) => {
            report.failures.push(fail(link, format!("price update: {err}")));
        }
    }
}

fn fail(link: &TrackedLink, reason: String) -> LinkFailure {
    LinkFailure {
        retail_id: link.retail_id.clone(),
        reason,
    }
}
