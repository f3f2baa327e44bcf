//! Pure mapping from the source product model to the destination listing
//! model. Translation never fails: missing inputs propagate as defaults.

use serde_json::Value;

use crate::retail::model::RetailOffer;
use crate::zone::model::{ZoneAttribute, ZoneListing, ZoneProduct};

/// Stand-in product code when the source offer carries no barcode.
pub const PLACEHOLDER_PRODUCT_CODE: &str = "pcode";
/// Every translated product is sold as new; condition mapping is a non-goal.
pub const CONDITION_NEW: &str = "NEW";
/// Substituted when the source description is present but empty.
pub const PLACEHOLDER_DESCRIPTION: &str = "Exported from Retail";
/// The destination accepts listings in its local currency only.
pub const DEFAULT_CURRENCY: &str = "RUB";

fn attribute_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// One destination product per source offer. Id, quantity and price are
/// copied verbatim; the attribute map flattens into an ordered pair list,
/// empty when the source has none.
pub fn convert_product(offer: &RetailOffer) -> ZoneProduct {
    let product_code = match offer.barcode.as_deref() {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => PLACEHOLDER_PRODUCT_CODE.to_string(),
    };

    let attributes = offer
        .properties
        .as_ref()
        .map(|props| {
            props
                .iter()
                .map(|(name, value)| ZoneAttribute {
                    name: name.clone(),
                    value: attribute_value(value),
                })
                .collect()
        })
        .unwrap_or_default();

    ZoneProduct {
        sku: offer.id.to_string(),
        quantity: offer.quantity,
        price: offer.price.clone(),
        product_code,
        condition: CONDITION_NEW.to_string(),
        attributes,
    }
}

/// One destination listing per source product. The placeholder description
/// kicks in only for an empty string; an absent description stays absent.
#[allow(clippy::too_many_arguments)]
pub fn convert_listing(
    title: String,
    description: Option<String>,
    listing_sku: Option<String>,
    category_name: Option<String>,
    brand: Option<String>,
    products: Vec<ZoneProduct>,
    main_image: Option<String>,
    extra_images: Option<Vec<String>>,
) -> ZoneListing {
    let description = description.map(|desc| {
        if desc.is_empty() {
            PLACEHOLDER_DESCRIPTION.to_string()
        } else {
            desc
        }
    });

    ZoneListing {
        title,
        description,
        listing_sku,
        category_name,
        brand,
        currency: DEFAULT_CURRENCY.to_string(),
        products,
        main_image,
        extra_images,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn offer() -> RetailOffer {
        RetailOffer {
            id: 77,
            quantity: 3,
            price: Some("149.90".into()),
            ..Default::default()
        }
    }

    #[test]
    fn convert_product_copies_fields_verbatim() {
        let product = convert_product(&offer());
        assert_eq!(product.sku, "77");
        assert_eq!(product.quantity, 3);
        assert_eq!(product.price.as_deref(), Some("149.90"));
        assert_eq!(product.condition, CONDITION_NEW);
    }

    #[test]
    fn convert_product_substitutes_placeholder_code() {
        let product = convert_product(&offer());
        assert_eq!(product.product_code, PLACEHOLDER_PRODUCT_CODE);

        let with_empty = RetailOffer {
            barcode: Some(String::new()),
            ..offer()
        };
        assert_eq!(
            convert_product(&with_empty).product_code,
            PLACEHOLDER_PRODUCT_CODE
        );

        let with_code = RetailOffer {
            barcode: Some("4601234567890".into()),
            ..offer()
        };
        assert_eq!(convert_product(&with_code).product_code, "4601234567890");
    }

    #[test]
    fn convert_product_without_attributes_yields_empty_list() {
        let product = convert_product(&offer());
        assert!(product.attributes.is_empty());
    }

    #[test]
    fn convert_product_flattens_attributes_in_source_order() {
        let mut props = Map::new();
        props.insert("color".into(), json!("red"));
        props.insert("weight".into(), json!(12));
        let with_props = RetailOffer {
            properties: Some(props),
            ..offer()
        };

        let product = convert_product(&with_props);
        assert_eq!(
            product.attributes,
            vec![
                ZoneAttribute {
                    name: "color".into(),
                    value: "red".into()
                },
                ZoneAttribute {
                    name: "weight".into(),
                    value: "12".into()
                },
            ]
        );
    }

    #[test]
    fn convert_listing_substitutes_placeholder_for_empty_description() {
        let listing = convert_listing(
            "Chair".into(),
            Some(String::new()),
            Some("1".into()),
            None,
            None,
            vec![],
            None,
            None,
        );
        assert_eq!(listing.description.as_deref(), Some(PLACEHOLDER_DESCRIPTION));
    }

    #[test]
    fn convert_listing_keeps_missing_description_missing() {
        let listing = convert_listing(
            "Chair".into(),
            None,
            Some("1".into()),
            None,
            None,
            vec![],
            None,
            None,
        );
        assert_eq!(listing.description, None);
    }

    #[test]
    fn convert_listing_forces_destination_currency() {
        let listing = convert_listing(
            "Chair".into(),
            Some("wooden".into()),
            None,
            Some("Furniture".into()),
            Some("Acme".into()),
            vec![convert_product(&offer())],
            Some("https://cdn/main.jpg".into()),
            Some(vec!["https://cdn/extra.jpg".into()]),
        );
        assert_eq!(listing.currency, DEFAULT_CURRENCY);
        assert_eq!(listing.description.as_deref(), Some("wooden"));
        assert_eq!(listing.category_name.as_deref(), Some("Furniture"));
        assert_eq!(listing.products.len(), 1);
    }
}
