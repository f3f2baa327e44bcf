//! End-to-end wiring of the schedule self-termination path: a cycle whose
//! source credential re-check fails must delete its own job record.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zonesync::model::{SyncInterval, SyncSettings, TrackedLink};
use zonesync::scheduler;
use zonesync::store;

async fn setup_pool() -> sqlx::SqlitePool {
    let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

#[tokio::test]
async fn cycle_with_revoked_source_credentials_deletes_its_record() {
    let retail = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v5/store/product-groups"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "errorMsg": "Wrong \"apiKey\" value."
        })))
        .mount(&retail)
        .await;

    let pool = setup_pool().await;
    let settings = SyncSettings {
        quantity_sync: true,
        price_sync: false,
        quantity_sync_interval: Some(SyncInterval::OneMinute),
        price_sync_interval: None,
    };
    let links = vec![TrackedLink {
        retail_id: "77".into(),
        zone_listing_id: "zl-1".into(),
        zone_product_id: "zp-1".into(),
        warehouse_id: "wh-9".into(),
    }];
    let ids = store::create_sync_jobs(
        &pool,
        &settings,
        &links,
        &retail.uri(),
        "revoked-key",
        "acc",
        "ref",
    )
    .await
    .unwrap();
    let job = store::get_job(&pool, &ids[0]).await.unwrap().unwrap();

    let survived = scheduler::run_job_cycle(&pool, &job).await.unwrap();

    assert!(!survived);
    assert!(store::get_job(&pool, &ids[0]).await.unwrap().is_none());
}
