//! Wire types for the source catalog API.
//!
//! Every paginated endpoint answers `{success, pagination, <items>}`; items
//! default to empty so a short page never fails deserialization.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// The source API is loose about numerics: prices arrive as JSON numbers or
/// strings depending on the installation. Normalize to decimal-as-string.
pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => None,
        other => Some(other.to_string()),
    }))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(rename = "totalCount")]
    pub total_count: i64,
    #[serde(rename = "totalPageCount")]
    pub total_page_count: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductsResponse {
    pub pagination: Pagination,
    #[serde(default)]
    pub products: Vec<RetailProduct>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GroupsResponse {
    #[serde(default)]
    pub success: bool,
    pub pagination: Pagination,
    #[serde(rename = "productGroup", default)]
    pub product_groups: Vec<RetailGroup>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InventoriesResponse {
    pub pagination: Pagination,
    #[serde(default)]
    pub offers: Vec<RetailInventory>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetailGroup {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupRef {
    pub id: i64,
}

/// One source product with its offers. A product becomes one destination
/// listing; each offer becomes one destination product inside it.
#[derive(Debug, Clone, Deserialize)]
pub struct RetailProduct {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub groups: Vec<GroupRef>,
    pub manufacturer: Option<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub offers: Vec<RetailOffer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetailOffer {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub price: Option<String>,
    pub barcode: Option<String>,
    pub properties: Option<Map<String, Value>>,
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub prices: Vec<OfferPrice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OfferPrice {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub price: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetailInventory {
    #[serde(default)]
    pub quantity: i64,
}
