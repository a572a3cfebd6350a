use serde_json::json;

use crate::client::{ApiClient, RequestOptions};
use crate::error::Result;
use crate::schema::GuestToken;

pub struct GuestTokens<'a> {
    client: &'a ApiClient,
}

impl<'a> GuestTokens<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Issue a guest token bound to `device_identifier`.
    pub async fn generate(&self, device_identifier: &str) -> Result<GuestToken> {
        let options = RequestOptions::post()
            .with_body(json!({ "device_identifier": device_identifier }))
            .unauthenticated();
        self.client.fetch("/public/tgs", options).await
    }
}
