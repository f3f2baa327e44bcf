//! Destination-side data model and wire types.
//!
//! `ZoneListing`/`ZoneProduct` double as the listing-creation payload: the
//! destination accepts them field-for-field, so they are plain serde structs.

use serde::{Deserialize, Serialize};

use crate::retail::model::opt_string_or_number;

/// One name/value attribute pair. Order mirrors source iteration order and is
/// not assumed stable across source systems.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneAttribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneProduct {
    pub sku: String,
    pub quantity: i64,
    pub price: Option<String>,
    pub product_code: String,
    pub condition: String,
    pub attributes: Vec<ZoneAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneListing {
    pub title: String,
    pub description: Option<String>,
    pub listing_sku: Option<String>,
    pub category_name: Option<String>,
    pub brand: Option<String>,
    pub currency: String,
    pub products: Vec<ZoneProduct>,
    pub main_image: Option<String>,
    pub extra_images: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct JwtPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JwtRefreshResp {
    pub access: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateWarehouseResp {
    pub id: String,
}

/// Slice of the listing-creation response we care about: the generated ids.
#[derive(Debug, Deserialize)]
pub(crate) struct CreatedListingResp {
    pub id: String,
    #[serde(default)]
    pub products: Vec<CreatedProductResp>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedProductResp {
    pub id: String,
    pub sku: String,
}

/// Listing-product detail returned by the destination, used by the
/// reconciliation reads.
#[derive(Debug, Deserialize)]
pub(crate) struct ListingProductResp {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub price: Option<String>,
    #[serde(default)]
    pub product_inventories: Vec<ProductInventory>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductInventory {
    pub warehouse: String,
    #[serde(default)]
    pub quantity: i64,
}
