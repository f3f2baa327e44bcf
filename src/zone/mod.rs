//! Client for the destination marketplace API (ZoneSmart-style).
//!
//! The access token is an explicit value threaded through every call rather
//! than client state; `refresh_access` hands back a new token instead of
//! mutating anything, so a failed refresh leaves nothing half-updated.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode, Url};
use serde_json::json;
use std::fmt;
use tracing::{info, warn};

use crate::error::ClientError;
use crate::model::{ExportFailure, TrackedLink};
use crate::zone::model::{
    CreateWarehouseResp, CreatedListingResp, JwtPair, JwtRefreshResp, ListingProductResp,
    ZoneListing,
};

pub mod model;

const ZONE_API_BASE: &str = "https://api.zonesmart.com/";

/// Destination access credential. Deliberately opaque: the only way to obtain
/// one is `login` or `refresh_access`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        AccessToken(token.into())
    }

    /// Raw token value, needed when persisting a job record.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn header_value(&self) -> String {
        format!("JWT {}", self.0)
    }
}

/// Outcome of one listing-creation run. Partial success is the steady state:
/// failed items are reported and skipped, never rolled back or retried.
#[derive(Debug, Default)]
pub struct CreatedListings {
    pub exported: Vec<ZoneListing>,
    pub links: Vec<TrackedLink>,
    pub failures: Vec<ExportFailure>,
}

/// Write/read access to the destination, narrowed to what the pipeline and
/// the reconciliation engine need.
#[async_trait]
pub trait ZoneApi: Send + Sync {
    /// Exchange the refresh credential for a fresh access token; `None` when
    /// the destination rejects the refresh token.
    async fn refresh_access(&self, refresh: &str) -> Result<Option<AccessToken>, ClientError>;

    /// Authenticated probe against a cheap read endpoint.
    async fn verify_access(&self, token: &AccessToken) -> Result<bool, ClientError>;

    /// Create one warehouse plus the given listings, sequentially, collecting
    /// a `TrackedLink` per created product.
    async fn create_listings(
        &self,
        token: &AccessToken,
        listings: &[ZoneListing],
    ) -> Result<CreatedListings, ClientError>;

    async fn get_price(
        &self,
        token: &AccessToken,
        listing_id: &str,
        product_id: &str,
    ) -> Result<Option<String>, ClientError>;

    async fn get_quantity(
        &self,
        token: &AccessToken,
        listing_id: &str,
        product_id: &str,
        warehouse_id: &str,
    ) -> Result<Option<i64>, ClientError>;

    async fn update_price(
        &self,
        token: &AccessToken,
        listing_id: &str,
        product_id: &str,
        price: &str,
    ) -> Result<bool, ClientError>;

    async fn update_quantity(
        &self,
        token: &AccessToken,
        product_id: &str,
        warehouse_id: &str,
        quantity: i64,
    ) -> Result<bool, ClientError>;
}

#[derive(Clone)]
pub struct ZoneClient {
    http: Client,
    base_url: Url,
}

impl fmt::Debug for ZoneClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoneClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ZoneClient {
    pub fn new() -> Self {
        let base_url = Url::parse(ZONE_API_BASE).expect("valid default Zone URL");
        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: Url) -> Self {
        let http = Client::builder()
            .user_agent("zonesync/0.1")
            .build()
            .expect("reqwest client");
        Self { http, base_url }
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url.join(path).map_err(|err| ClientError::Status {
            status: 0,
            body: format!("invalid endpoint path {path:?}: {err}"),
        })
    }

    /// Exchange account credentials for a JWT pair; `None` on rejection.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<JwtPair>, ClientError> {
        let res = self
            .http
            .post(self.endpoint("v1/auth/jwt/create/")?)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        if !res.status().is_success() {
            return Ok(None);
        }
        Ok(Some(res.json::<JwtPair>().await?))
    }

    pub async fn refresh_access(
        &self,
        refresh: &str,
    ) -> Result<Option<AccessToken>, ClientError> {
        let res = self
            .http
            .post(self.endpoint("v1/auth/jwt/refresh/")?)
            .json(&json!({ "refresh": refresh }))
            .send()
            .await?;
        if !res.status().is_success() {
            return Ok(None);
        }
        let body = res.json::<JwtRefreshResp>().await?;
        Ok(Some(AccessToken(body.access)))
    }

    pub async fn verify_access(&self, token: &AccessToken) -> Result<bool, ClientError> {
        let res = self
            .http
            .get(self.endpoint("v1/zonesmart/marketplace/")?)
            .header("Authorization", token.header_value())
            .send()
            .await?;
        Ok(res.status().is_success())
    }

    async fn create_warehouse(&self, token: &AccessToken) -> Result<String, ClientError> {
        let name = format!("Export from Retail at: {}", Utc::now().format("%Y-%m-%d %H:%M:%S"));
        let res = self
            .http
            .post(self.endpoint("v1/zonesmart/warehouse/")?)
            .header("Authorization", token.header_value())
            .json(&json!({ "name": name }))
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ClientError::status(status, body));
        }
        Ok(res.json::<CreateWarehouseResp>().await?.id)
    }

    async fn set_default_warehouse(
        &self,
        token: &AccessToken,
        warehouse_id: &str,
    ) -> Result<bool, ClientError> {
        let res = self
            .http
            .post(self.endpoint(&format!("v1/zonesmart/warehouse/{warehouse_id}/set_default/"))?)
            .header("Authorization", token.header_value())
            .send()
            .await?;
        Ok(res.status().is_success())
    }

    pub async fn create_listings(
        &self,
        token: &AccessToken,
        listings: &[ZoneListing],
    ) -> Result<CreatedListings, ClientError> {
        let warehouse_id = self.create_warehouse(token).await?;
        if !self.set_default_warehouse(token, &warehouse_id).await? {
            warn!(%warehouse_id, "could not mark export warehouse as default");
        }

        let mut result = CreatedListings::default();
        for listing in listings {
            let response = self
                .http
                .post(self.endpoint("v1/zonesmart/listing/")?)
                .header("Authorization", token.header_value())
                .json(listing)
                .send()
                .await;
            let res = match response {
                Ok(res) => res,
                Err(err) => {
                    warn!(title = %listing.title, %err, "listing creation failed in transit");
                    result.failures.push(ExportFailure {
                        title: listing.title.clone(),
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            if res.status() != StatusCode::CREATED {
                let status = res.status();
                let body = res.text().await.unwrap_or_default();
                warn!(title = %listing.title, %status, "destination rejected listing");
                result.failures.push(ExportFailure {
                    title: listing.title.clone(),
                    reason: format!("status {status}: {body}"),
                });
                continue;
            }

            let created = res.json::<CreatedListingResp>().await?;
            info!(title = %listing.title, listing_id = %created.id, "listing created");
            for product in created.products {
                result.links.push(TrackedLink {
                    retail_id: product.sku,
                    zone_listing_id: created.id.clone(),
                    zone_product_id: product.id,
                    warehouse_id: warehouse_id.clone(),
                });
            }
            result.exported.push(listing.clone());
        }
        Ok(result)
    }

    async fn get_listing_product(
        &self,
        token: &AccessToken,
        listing_id: &str,
        product_id: &str,
    ) -> Result<Option<ListingProductResp>, ClientError> {
        let res = self
            .http
            .get(self.endpoint(&format!(
                "v1/zonesmart/listing/{listing_id}/product/{product_id}/"
            ))?)
            .header("Authorization", token.header_value())
            .send()
            .await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ClientError::status(status, body));
        }
        Ok(Some(res.json::<ListingProductResp>().await?))
    }

    pub async fn get_price(
        &self,
        token: &AccessToken,
        listing_id: &str,
        product_id: &str,
    ) -> Result<Option<String>, ClientError> {
        let product = self.get_listing_product(token, listing_id, product_id).await?;
        Ok(product.and_then(|p| p.price))
    }

    /// Quantity in the given warehouse; `None` when the listing product or a
    /// matching warehouse entry is missing.
    pub async fn get_quantity(
        &self,
        token: &AccessToken,
        listing_id: &str,
        product_id: &str,
        warehouse_id: &str,
    ) -> Result<Option<i64>, ClientError> {
        let product = self.get_listing_product(token, listing_id, product_id).await?;
        Ok(product.and_then(|p| {
            p.product_inventories
                .iter()
                .find(|inv| inv.warehouse == warehouse_id)
                .map(|inv| inv.quantity)
        }))
    }

    pub async fn update_price(
        &self,
        token: &AccessToken,
        listing_id: &str,
        product_id: &str,
        price: &str,
    ) -> Result<bool, ClientError> {
        let res = self
            .http
            .patch(self.endpoint(&format!(
                "v1/zonesmart/listing/{listing_id}/product/{product_id}/"
            ))?)
            .header("Authorization", token.header_value())
            .json(&json!({ "price": price }))
            .send()
            .await?;
        Ok(res.status().is_success())
    }

    /// Bulk inventory-update call, issued for a single product at a time.
    pub async fn update_quantity(
        &self,
        token: &AccessToken,
        product_id: &str,
        warehouse_id: &str,
        quantity: i64,
    ) -> Result<bool, ClientError> {
        let body = json!({
            "inventory": [{
                "product": product_id,
                "warehouse": warehouse_id,
                "quantity": quantity,
            }]
        });
        let res = self
            .http
            .post(self.endpoint("v1/zonesmart/product_inventory/bulk_update/")?)
            .header("Authorization", token.header_value())
            .json(&body)
            .send()
            .await?;
        Ok(res.status().is_success())
    }
}

impl Default for ZoneClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ZoneApi for ZoneClient {
    async fn refresh_access(&self, refresh: &str) -> Result<Option<AccessToken>, ClientError> {
        ZoneClient::refresh_access(self, refresh).await
    }

    async fn verify_access(&self, token: &AccessToken) -> Result<bool, ClientError> {
        ZoneClient::verify_access(self, token).await
    }

    async fn create_listings(
        &self,
        token: &AccessToken,
        listings: &[ZoneListing],
    ) -> Result<CreatedListings, ClientError> {
        ZoneClient::create_listings(self, token, listings).await
    }

    async fn get_price(
        &self,
        token: &AccessToken,
        listing_id: &str,
        product_id: &str,
    ) -> Result<Option<String>, ClientError> {
        ZoneClient::get_price(self, token, listing_id, product_id).await
    }

    async fn get_quantity(
        &self,
        token: &AccessToken,
        listing_id: &str,
        product_id: &str,
        warehouse_id: &str,
    ) -> Result<Option<i64>, ClientError> {
        ZoneClient::get_quantity(self, token, listing_id, product_id, warehouse_id).await
    }

    async fn update_price(
        &self,
        token: &AccessToken,
        listing_id: &str,
        product_id: &str,
        price: &str,
    ) -> Result<bool, ClientError> {
        ZoneClient::update_price(self, token, listing_id, product_id, price).await
    }

    async fn update_quantity(
        &self,
        token: &AccessToken,
        product_id: &str,
        warehouse_id: &str,
        quantity: i64,
    ) -> Result<bool, ClientError> {
        ZoneClient::update_quantity(self, token, product_id, warehouse_id, quantity).await
    }
}
