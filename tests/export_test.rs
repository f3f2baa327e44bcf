use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use zonesync::error::{ClientError, ExportError};
use zonesync::export::{export_catalog, export_listings, RetailCredentials};
use zonesync::model::{ExportFailure, ProductFilter, SyncInterval, SyncKind, SyncSettings, TrackedLink};
use zonesync::retail::RetailApi;
use zonesync::store;
use zonesync::translate;
use zonesync::zone::model::ZoneListing;
use zonesync::zone::{AccessToken, CreatedListings, ZoneApi};

async fn setup_pool() -> sqlx::SqlitePool {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

fn listing(title: &str) -> ZoneListing {
    translate::convert_listing(
        title.into(),
        Some("described".into()),
        Some("1".into()),
        None,
        None,
        vec![],
        None,
        None,
    )
}

fn creds() -> RetailCredentials {
    RetailCredentials {
        address: "https://demo.retailcrm.ru".into(),
        api_key: "key".into(),
    }
}

fn both_dimensions() -> SyncSettings {
    SyncSettings {
        quantity_sync: true,
        price_sync: true,
        quantity_sync_interval: Some(SyncInterval::FiveMinutes),
        price_sync_interval: Some(SyncInterval::OneHour),
    }
}

#[derive(Clone, Default)]
struct FakeRetail {
    login_ok: bool,
    catalog: Vec<ZoneListing>,
    login_calls: Arc<Mutex<usize>>,
    fetch_calls: Arc<Mutex<usize>>,
}

#[async_trait::async_trait]
impl RetailApi for FakeRetail {
    async fn check_login(&self) -> Result<bool, ClientError> {
        *self.login_calls.lock().unwrap() += 1;
        Ok(self.login_ok)
    }

    async fn fetch_groups(&self) -> Result<HashMap<i64, String>, ClientError> {
        Ok(HashMap::new())
    }

    async fn fetch_products(
        &self,
        _filter: Option<&ProductFilter>,
    ) -> Result<Vec<ZoneListing>, ClientError> {
        *self.fetch_calls.lock().unwrap() += 1;
        Ok(self.catalog.clone())
    }

    async fn get_product_quantity(&self, _product_id: &str) -> Result<Option<i64>, ClientError> {
        Ok(None)
    }

    async fn get_offer_price(&self, _offer_id: &str) -> Result<Option<String>, ClientError> {
        Ok(None)
    }
}

/// Scripted destination: succeeds for every listing except titles listed in
/// `rejected`, in input order, one link per exported listing.
#[derive(Clone, Default)]
struct FakeZone {
    rejected: Vec<String>,
    create_calls: Arc<Mutex<usize>>,
}

#[async_trait::async_trait]
impl ZoneApi for FakeZone {
    async fn refresh_access(&self, _refresh: &str) -> Result<Option<AccessToken>, ClientError> {
        Ok(Some(AccessToken::new("fresh")))
    }

    async fn verify_access(&self, _token: &AccessToken) -> Result<bool, ClientError> {
        Ok(true)
    }

    async fn create_listings(
        &self,
        _token: &AccessToken,
        listings: &[ZoneListing],
    ) -> Result<CreatedListings, ClientError> {
        *self.create_calls.lock().unwrap() += 1;
        let mut result = CreatedListings::default();
        for (i, listing) in listings.iter().enumerate() {
            if self.rejected.contains(&listing.title) {
                result.failures.push(ExportFailure {
                    title: listing.title.clone(),
                    reason: "status 400 Bad Request: bad listing".into(),
                });
                continue;
            }
            result.links.push(TrackedLink {
                retail_id: listing.listing_sku.clone().unwrap_or_default(),
                zone_listing_id: format!("zl-{i}"),
                zone_product_id: format!("zp-{i}"),
                warehouse_id: "wh-1".into(),
            });
            result.exported.push(listing.clone());
        }
        Ok(result)
    }

    async fn get_price(
        &self,
        _token: &AccessToken,
        _listing_id: &str,
        _product_id: &str,
    ) -> Result<Option<String>, ClientError> {
        Ok(None)
    }

    async fn get_quantity(
        &self,
        _token: &AccessToken,
        _listing_id: &str,
        _product_id: &str,
        _warehouse_id: &str,
    ) -> Result<Option<i64>, ClientError> {
        Ok(None)
    }

    async fn update_price(
        &self,
        _token: &AccessToken,
        _listing_id: &str,
        _product_id: &str,
        _price: &str,
    ) -> Result<bool, ClientError> {
        Ok(true)
    }

    async fn update_quantity(
        &self,
        _token: &AccessToken,
        _product_id: &str,
        _warehouse_id: &str,
        _quantity: i64,
    ) -> Result<bool, ClientError> {
        Ok(true)
    }
}

#[tokio::test]
async fn invalid_settings_are_rejected_before_any_network_call() {
    let pool = setup_pool().await;
    let retail = FakeRetail {
        login_ok: true,
        ..Default::default()
    };
    let zone = FakeZone::default();
    let settings = SyncSettings {
        quantity_sync: true,
        price_sync: false,
        quantity_sync_interval: None,
        price_sync_interval: None,
    };

    let err = export_catalog(
        &retail,
        &zone,
        &AccessToken::new("tok"),
        "refresh",
        &creds(),
        None,
        &settings,
        &pool,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ExportError::Settings(_)));
    assert_eq!(*retail.login_calls.lock().unwrap(), 0);
    assert_eq!(*zone.create_calls.lock().unwrap(), 0);
    assert!(store::list_active_jobs(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_listing_batch_is_a_validation_failure() {
    let pool = setup_pool().await;
    let retail = FakeRetail {
        login_ok: true,
        ..Default::default()
    };
    let zone = FakeZone::default();

    let err = export_listings(
        &retail,
        &zone,
        &AccessToken::new("tok"),
        "refresh",
        &creds(),
        vec![],
        &both_dimensions(),
        &pool,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ExportError::Settings(_)));
    assert_eq!(*zone.create_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn bad_source_credentials_surface_as_auth_failure() {
    let pool = setup_pool().await;
    let retail = FakeRetail {
        login_ok: false,
        catalog: vec![listing("Chair")],
        ..Default::default()
    };
    let zone = FakeZone::default();

    let err = export_catalog(
        &retail,
        &zone,
        &AccessToken::new("tok"),
        "refresh",
        &creds(),
        None,
        &both_dimensions(),
        &pool,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ExportError::AuthFailure));
    assert_eq!(*retail.fetch_calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn partial_success_keeps_order_and_registers_jobs() {
    let pool = setup_pool().await;
    let retail = FakeRetail {
        login_ok: true,
        catalog: vec![listing("Chair"), listing("Table"), listing("Lamp")],
        ..Default::default()
    };
    let zone = FakeZone {
        rejected: vec!["Table".into()],
        ..Default::default()
    };

    let outcome = export_catalog(
        &retail,
        &zone,
        &AccessToken::new("tok"),
        "refresh",
        &creds(),
        None,
        &both_dimensions(),
        &pool,
    )
    .await
    .unwrap();

    let titles: Vec<&str> = outcome.exported.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, vec!["Chair", "Lamp"]);
    assert_eq!(outcome.links.len(), 2);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].title, "Table");

    // One job record per enabled dimension, each with its own interval and
    // the shared link batch.
    assert_eq!(outcome.job_ids.len(), 2);
    let jobs = store::list_active_jobs(&pool).await.unwrap();
    assert_eq!(jobs.len(), 2);
    let quantity_job = jobs.iter().find(|j| j.kind == SyncKind::Quantity).unwrap();
    let price_job = jobs.iter().find(|j| j.kind == SyncKind::Price).unwrap();
    assert_eq!(quantity_job.interval, SyncInterval::FiveMinutes);
    assert_eq!(price_job.interval, SyncInterval::OneHour);
    assert_eq!(quantity_job.tracked_links().unwrap(), outcome.links);
    assert_eq!(price_job.retail_address, "https://demo.retailcrm.ru");
}

#[tokio::test]
async fn zero_created_listings_is_a_normal_empty_outcome() {
    let pool = setup_pool().await;
    let retail = FakeRetail {
        login_ok: true,
        catalog: vec![listing("Chair")],
        ..Default::default()
    };
    let zone = FakeZone {
        rejected: vec!["Chair".into()],
        ..Default::default()
    };

    let outcome = export_catalog(
        &retail,
        &zone,
        &AccessToken::new("tok"),
        "refresh",
        &creds(),
        None,
        &both_dimensions(),
        &pool,
    )
    .await
    .unwrap();

    assert!(outcome.exported.is_empty());
    assert!(outcome.links.is_empty());
    assert!(outcome.job_ids.is_empty());
    assert_eq!(outcome.failures.len(), 1);
    assert!(store::list_active_jobs(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_catalog_skips_creation_entirely() {
    let pool = setup_pool().await;
    let retail = FakeRetail {
        login_ok: true,
        ..Default::default()
    };
    let zone = FakeZone::default();

    let outcome = export_catalog(
        &retail,
        &zone,
        &AccessToken::new("tok"),
        "refresh",
        &creds(),
        Some(&ProductFilter {
            active: Some(1),
            min_quantity: Some(5),
            groups: None,
        }),
        &both_dimensions(),
        &pool,
    )
    .await
    .unwrap();

    assert!(outcome.exported.is_empty());
    assert_eq!(*zone.create_calls.lock().unwrap(), 0);
}
