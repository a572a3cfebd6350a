//! Cart bodies

use serde::{Deserialize, Serialize};

use super::catalog::{Brand, Category, Media};
use super::de;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub total_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub product_id: String,
    #[serde(default)]
    pub product_attribute_id: Option<String>,
    pub quantity: u32,
    pub device_token: String,
    pub notes: String,
    pub created_at: String,
    pub total_price: f64,
    pub product: CartProduct,
}

/// Product snapshot embedded in a cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: String,
    pub title: String,
    pub description: String,
    pub short_description: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub is_taxable: bool,
    pub sku: String,
    pub slug: String,
    pub currency: String,
    pub unit: String,
    pub disable: bool,
    pub out_of_stock: bool,
    pub reviews_count: u64,
    pub cover_media_file_id: Option<String>,
    pub rating: f64,
    pub attributes: Vec<CartProductAttribute>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub media: Vec<Media>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub categories: Vec<Category>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub brands: Vec<Brand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartProductAttribute {
    pub id: String,
    pub product_id: String,
    pub parent_id: Option<String>,
    pub media_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub extra: String,
    #[serde(default)]
    pub price: Option<f64>,
    pub children: Vec<serde_json::Value>,
}

/// Body of cart upsert and add. The device token is added by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartInput {
    pub product_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub product_attribute_id: Option<String>,
    pub quantity: u32,
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn cart_item_json(product_id: &str) -> serde_json::Value {
        json!({
            "id": "ci-1",
            "product_id": product_id,
            "quantity": 2,
            "device_token": "device-1",
            "notes": "",
            "created_at": "2024-05-01T10:00:00Z",
            "total_price": 20.0,
            "product": {
                "id": product_id,
                "title": "Mug",
                "description": "",
                "short_description": "",
                "price": null,
                "is_taxable": null,
                "sku": "MUG",
                "slug": "mug",
                "currency": "CAD",
                "unit": "piece",
                "disable": false,
                "out_of_stock": false,
                "reviews_count": 0,
                "cover_media_file_id": null,
                "rating": 0,
                "attributes": [],
                "media": null,
                "categories": null,
                "brands": null
            }
        })
    }

    #[test]
    fn cart_defaults_total_price_and_nullable_product_fields() {
        let cart: Cart = serde_json::from_value(json!({
            "items": [cart_item_json("p-1")]
        }))
        .unwrap();
        assert_eq!(cart.total_price, 0.0);
        let product = &cart.items[0].product;
        assert!(!product.is_taxable);
        assert!(product.price.is_none());
        assert!(product.media.is_empty());
    }

    #[test]
    fn cart_input_omits_absent_customer() {
        let body = serde_json::to_value(CartInput {
            product_id: "p-1".into(),
            customer_id: None,
            product_attribute_id: None,
            quantity: 1,
            notes: String::new(),
        })
        .unwrap();
        assert!(body.get("customer_id").is_none());
        assert_eq!(body["product_attribute_id"], serde_json::Value::Null);
    }
}
