use crate::client::{ApiClient, RequestOptions};
use crate::error::Result;
use crate::schema::TenantInfo;

pub struct Tenants<'a> {
    client: &'a ApiClient,
}

impl<'a> Tenants<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Public metadata of the configured tenant (address, taxes, currency).
    pub async fn get(&self) -> Result<TenantInfo> {
        self.client
            .fetch("/public/tenant", RequestOptions::get().unauthenticated())
            .await
    }
}
