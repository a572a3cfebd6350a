use serde::Serialize;

use crate::client::{ApiClient, RequestOptions};
use crate::error::Result;
use crate::query::with_query;
use crate::schema::SupplierList;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplierOrder {
    #[default]
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplierQuery {
    pub page: u32,
    pub size: u32,
    pub lang: String,
    pub sort_by: SortDirection,
    pub order_by: SupplierOrder,
}

impl SupplierQuery {
    /// English, oldest first.
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            lang: "en".into(),
            sort_by: SortDirection::default(),
            order_by: SupplierOrder::default(),
        }
    }
}

pub struct Suppliers<'a> {
    client: &'a ApiClient,
}

impl<'a> Suppliers<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, query: &SupplierQuery) -> Result<SupplierList> {
        let endpoint = with_query("/public/suppliers", query)?;
        self.client
            .fetch(&endpoint, RequestOptions::get().unauthenticated())
            .await
    }
}
