//! Catalog bodies: products, categories, brands, suppliers, branches,
//! menus, reviews, favorites, tenant metadata and guest tokens

use serde::{Deserialize, Serialize};

use super::{Page, de};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: String,
    pub content_type: String,
    pub file_id: String,
    pub alt: String,
}

/// One titled block of a product's long description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptionSection {
    pub title: String,
    pub index: i64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAttribute {
    pub id: String,
    pub product_id: String,
    pub parent_id: Option<String>,
    pub media_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub extra: String,
    pub children: Vec<AttributeOption>,
}

/// A selectable variant under a product attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeOption {
    pub id: String,
    pub product_id: String,
    pub parent_id: String,
    pub media_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub extra: String,
    pub price: f64,
    pub sku: String,
    pub children: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "de::description_sections")]
    pub description: Vec<DescriptionSection>,
    pub short_description: String,
    pub price: f64,
    pub rating: f64,
    pub sku: String,
    pub slug: String,
    #[serde(deserialize_with = "de::currency")]
    pub currency: String,
    pub unit: String,
    #[serde(default)]
    pub weight: Option<f64>,
    pub disable: bool,
    pub out_of_stock: bool,
    pub attributes: Vec<ProductAttribute>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub media: Vec<Media>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub categories: Vec<Category>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub brands: Vec<Brand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductListItem {
    pub id: String,
    pub title: String,
    pub price: f64,
    pub sku: String,
    pub slug: Option<String>,
    #[serde(deserialize_with = "de::currency")]
    pub currency: String,
    pub unit: String,
    #[serde(default)]
    pub weight: Option<f64>,
    pub out_of_stock: bool,
    pub media_id: Option<String>,
    pub media_content_type: Option<String>,
    pub media_file_id: Option<String>,
    pub cover_media_file_id: Option<String>,
    pub category_id: Option<String>,
    pub category_title: Option<String>,
    pub brand_id: Option<String>,
    pub brand_title: Option<String>,
}

pub type ProductList = Page<ProductListItem>;

/// Catalog listing filters.
#[derive(Debug, Clone, Serialize)]
pub struct ProductQuery {
    pub locale: String,
    pub page: u32,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryListItem {
    pub id: String,
    pub parent_id: Option<String>,
    pub media_id: Option<String>,
    pub title: String,
    /// Number of products in the category
    pub products: u64,
    pub children: Vec<CategoryChild>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryChild {
    pub id: String,
    pub parent_id: String,
    pub media_id: Option<String>,
    pub title: String,
    pub children: Vec<serde_json::Value>,
}

pub type CategoryList = Page<CategoryListItem>;
pub type BrandList = Page<Brand>;
pub type SupplierList = Page<Supplier>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub created_at: String,
    #[serde(default)]
    pub products: serde_json::Value,
    #[serde(default)]
    pub orders: serde_json::Value,
    #[serde(default)]
    pub drivers: serde_json::Value,
    pub geozones: Vec<Geozone>,
}

/// Delivery area of a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geozone {
    pub id: String,
    pub branch_id: String,
    pub name: String,
    pub polygon: Vec<Coordinate>,
    pub delivery_cost: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

pub type BranchList = Page<Branch>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub title: String,
    pub parent_id: Option<String>,
    pub image_media_id: Option<String>,
    pub url: String,
    /// Display order
    pub vorder: Option<i64>,
    pub target: String,
}

pub type MenuList = Page<MenuItem>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantInfo {
    pub address_city: String,
    pub address_line1: String,
    pub address_postal_zip_code: String,
    pub address_prov_state: String,
    pub company: String,
    pub contact_phone: String,
    pub currency: String,
    pub federal_tax: f64,
    pub mode: String,
    pub province_tax: f64,
    pub tenant_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestToken {
    pub token: String,
}

/// A product rating submitted by a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewInput {
    #[serde(default)]
    pub product_attribute_id: Option<String>,
    pub customer_id: String,
    pub rating: f64,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub product_id: String,
    pub product_attribute_id: Option<String>,
    pub customer_id: String,
    #[serde(default)]
    pub customer_firstname: Option<String>,
    #[serde(default)]
    pub customer_lastname: Option<String>,
    #[serde(default)]
    pub is_verified: Option<bool>,
    pub rating: f64,
    pub comment: String,
    pub created_at: String,
}

pub type ReviewList = Page<Review>;

/// Body of favorite add and delete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FavoriteInput {
    pub product_attribute_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: String,
    pub title: String,
    pub customer_id: String,
    pub product_id: String,
    pub product_attribute_id: Option<String>,
    pub product_cover_media_id: String,
    pub cover_media_file_id: String,
    pub price: f64,
    pub sku: String,
    pub slug: String,
    pub out_of_stock: bool,
    pub media_id: String,
    pub media_content_type: String,
    pub media_file_id: String,
    pub created_at: String,
}

pub type FavoriteList = Page<Favorite>;
