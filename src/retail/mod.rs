//! Read-only client for the source catalog API (RetailCRM-style v5).
//!
//! All list endpoints are paginated with a fixed page size; the fetch
//! operations drain every page sequentially. Credentials travel as the
//! `apiKey` query parameter, the way the vendor's own client library sends
//! them.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

use crate::error::ClientError;
use crate::model::ProductFilter;
use crate::retail::model::{GroupsResponse, InventoriesResponse, ProductsResponse};
use crate::translate;
use crate::zone::model::ZoneListing;

pub mod model;

/// Fixed page size used for every paginated read.
const PAGE_SIZE: u32 = 20;

/// Read access to the source catalog, narrowed to what the export pipeline
/// and the reconciliation engine need. Lets tests swap in a recording fake.
#[async_trait]
pub trait RetailApi: Send + Sync {
    /// Credential probe: a trivial read call whose API-level success flag
    /// decides the outcome. A non-2xx answer is a failed login, not an error.
    async fn check_login(&self) -> Result<bool, ClientError>;

    /// Drain all group pages into an id -> name map (last write wins on
    /// duplicate ids).
    async fn fetch_groups(&self) -> Result<HashMap<i64, String>, ClientError>;

    /// Fetch the catalog (optionally filtered) already translated into
    /// destination listings: one listing per product, one product per offer.
    async fn fetch_products(
        &self,
        filter: Option<&ProductFilter>,
    ) -> Result<Vec<ZoneListing>, ClientError>;

    /// Current stock for one product; `None` when the source has no match.
    async fn get_product_quantity(&self, product_id: &str) -> Result<Option<i64>, ClientError>;

    /// Current price for one offer; `None` when the offer is gone from the
    /// source.
    async fn get_offer_price(&self, offer_id: &str) -> Result<Option<String>, ClientError>;
}

#[derive(Clone)]
pub struct RetailClient {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl fmt::Debug for RetailClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetailClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl RetailClient {
    /// `address` is the shop's API root, e.g. `https://demo.retailcrm.ru`.
    pub fn new(address: &str, api_key: String) -> Result<Self, ClientError> {
        let base_url = Url::parse(address).map_err(|err| ClientError::Status {
            status: 0,
            body: format!("invalid source address {address:?}: {err}"),
        })?;
        let http = Client::builder()
            .user_agent("zonesync/0.1")
            .build()
            .expect("reqwest client");
        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(String, String)],
    ) -> Result<T, ClientError> {
        let url = self.base_url.join(path).map_err(|err| ClientError::Status {
            status: 0,
            body: format!("invalid endpoint path {path:?}: {err}"),
        })?;
        let res = self
            .http
            .get(url)
            .query(&[("apiKey", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ClientError::status(status, body));
        }
        Ok(res.json::<T>().await?)
    }

    fn page_query(page: i64) -> Vec<(String, String)> {
        vec![
            ("limit".into(), PAGE_SIZE.to_string()),
            ("page".into(), page.to_string()),
        ]
    }

    /// Translate our filter into the source's native query vocabulary.
    fn filter_query(filter: &ProductFilter) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(active) = filter.active {
            query.push(("filter[active]".into(), active.to_string()));
        }
        if let Some(min_quantity) = filter.min_quantity {
            query.push(("filter[minQuantity]".into(), min_quantity.to_string()));
        }
        if let Some(groups) = &filter.groups {
            for group in groups {
                query.push(("filter[groups][]".into(), group.to_string()));
            }
        }
        query
    }

    pub async fn check_login(&self) -> Result<bool, ClientError> {
        let mut query = Self::page_query(1);
        query.push(("filter[active]".into(), "1".into()));
        let url = self
            .base_url
            .join("api/v5/store/product-groups")
            .map_err(|err| ClientError::Status {
                status: 0,
                body: format!("invalid endpoint path: {err}"),
            })?;
        let res = self
            .http
            .get(url)
            .query(&[("apiKey", self.api_key.as_str())])
            .query(&query)
            .send()
            .await?;
        if !res.status().is_success() {
            return Ok(false);
        }
        let body: serde_json::Value = res.json().await?;
        Ok(body
            .get("success")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false))
    }

    pub async fn fetch_groups(&self) -> Result<HashMap<i64, String>, ClientError> {
        let mut groups = HashMap::new();
        let mut page = 1;
        loop {
            let resp: GroupsResponse = self
                .get_json("api/v5/store/product-groups", &Self::page_query(page))
                .await?;
            if !resp.success {
                warn!(page, "source reported failure on group page");
            }
            for group in resp.product_groups {
                groups.insert(group.id, group.name);
            }
            if page >= resp.pagination.total_page_count {
                break;
            }
            page += 1;
        }
        Ok(groups)
    }

    pub async fn fetch_products(
        &self,
        filter: Option<&ProductFilter>,
    ) -> Result<Vec<ZoneListing>, ClientError> {
        let groups = self.fetch_groups().await?;
        let filter_query = filter.map(Self::filter_query).unwrap_or_default();

        let mut listings = Vec::new();
        let mut page = 1;
        loop {
            let mut query = Self::page_query(page);
            query.extend(filter_query.iter().cloned());
            let resp: ProductsResponse = self.get_json("api/v5/store/products", &query).await?;

            // Zero total matches: answer with an empty set without walking
            // further pages.
            if resp.pagination.total_count == 0 {
                break;
            }

            for product in &resp.products {
                let mut offers = Vec::with_capacity(product.offers.len());
                let mut extra_images = None;
                for offer in &product.offers {
                    extra_images = offer.images.clone();
                    offers.push(translate::convert_product(offer));
                }
                let category_name = product
                    .groups
                    .first()
                    .and_then(|group| groups.get(&group.id))
                    .cloned();
                listings.push(translate::convert_listing(
                    product.name.clone(),
                    product.description.clone(),
                    Some(product.id.to_string()),
                    category_name,
                    product.manufacturer.clone(),
                    offers,
                    product.image_url.clone(),
                    extra_images,
                ));
            }

            if page >= resp.pagination.total_page_count {
                break;
            }
            page += 1;
        }
        Ok(listings)
    }

    pub async fn get_product_quantity(
        &self,
        product_id: &str,
    ) -> Result<Option<i64>, ClientError> {
        let mut query = Self::page_query(1);
        query.push(("filter[ids][]".into(), product_id.to_string()));
        let resp: InventoriesResponse = self.get_json("api/v5/store/inventories", &query).await?;
        if resp.pagination.total_count == 0 {
            return Ok(None);
        }
        Ok(resp.offers.first().map(|offer| offer.quantity))
    }

    pub async fn get_offer_price(&self, offer_id: &str) -> Result<Option<String>, ClientError> {
        let filter = vec![("filter[offerIds][]".to_string(), offer_id.to_string())];
        let mut page = 1;
        loop {
            let mut query = Self::page_query(page);
            query.extend(filter.iter().cloned());
            let resp: ProductsResponse = self.get_json("api/v5/store/products", &query).await?;
            if resp.pagination.total_count == 0 {
                return Ok(None);
            }
            for product in &resp.products {
                for offer in &product.offers {
                    if let Some(price) = offer.prices.first().and_then(|p| p.price.clone()) {
                        return Ok(Some(price));
                    }
                }
            }
            if page >= resp.pagination.total_page_count {
                return Ok(None);
            }
            page += 1;
        }
    }
}

#[async_trait]
impl RetailApi for RetailClient {
    async fn check_login(&self) -> Result<bool, ClientError> {
        RetailClient::check_login(self).await
    }

    async fn fetch_groups(&self) -> Result<HashMap<i64, String>, ClientError> {
        RetailClient::fetch_groups(self).await
    }

    async fn fetch_products(
        &self,
        filter: Option<&ProductFilter>,
    ) -> Result<Vec<ZoneListing>, ClientError> {
        RetailClient::fetch_products(self, filter).await
    }

    async fn get_product_quantity(&self, product_id: &str) -> Result<Option<i64>, ClientError> {
        RetailClient::get_product_quantity(self, product_id).await
    }

    async fn get_offer_price(&self, offer_id: &str) -> Result<Option<String>, ClientError> {
        RetailClient::get_offer_price(self, offer_id).await
    }
}
