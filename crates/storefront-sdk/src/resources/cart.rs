//! Device-scoped cart
//!
//! Cart writes are public calls keyed by the device token from the credential
//! store; only reading a cart by id needs a signed-in user.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::client::{ApiClient, RequestOptions};
use crate::error::{Error, Result};
use crate::query::with_query;
use crate::schema::{Cart, CartInput};

/// Product id the backend uses for lines whose product no longer exists
const NIL_PRODUCT_ID: &str = "00000000-0000-0000-0000-000000000000";

#[derive(Serialize)]
struct DeviceScoped<'a, T> {
    #[serde(flatten)]
    body: &'a T,
    device_token: String,
}

#[derive(Serialize)]
struct CartQuery<'a> {
    device_token: &'a str,
    locale: &'a str,
}

pub struct Carts<'a> {
    client: &'a ApiClient,
}

impl<'a> Carts<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, cart_id: &str, locale: &str) -> Result<Cart> {
        let endpoint = with_query(&format!("/cart/{cart_id}"), &[("locale", locale)])?;
        self.client.fetch(&endpoint, RequestOptions::get()).await
    }

    /// Set the quantity of a line, creating it if needed.
    pub async fn upsert(&self, item: &CartInput) -> Result<()> {
        self.write("/public/cart", item).await
    }

    /// Add to the quantity of a line, creating it if needed.
    pub async fn add(&self, item: &CartInput) -> Result<()> {
        self.write("/public/cart/add", item).await
    }

    /// This device's cart. Lines pointing at deleted products are dropped.
    pub async fn query(&self, locale: &str) -> Result<Cart> {
        let device_token = self.client.device_token()?;
        let endpoint = with_query(
            "/public/cart",
            &CartQuery {
                device_token: &device_token,
                locale,
            },
        )?;
        let mut body: Value = self
            .client
            .fetch(&endpoint, RequestOptions::get().unauthenticated())
            .await?;

        if let Some(items) = body.get_mut("items").and_then(Value::as_array_mut) {
            let before = items.len();
            items.retain(|item| item["product"]["id"].as_str() != Some(NIL_PRODUCT_ID));
            if items.len() != before {
                debug!(dropped = before - items.len(), "dropped cart lines without product");
            }
        }

        serde_json::from_value(body)
            .map_err(|e| Error::Validation(format!("response does not match Cart: {e}")))
    }

    pub async fn remove_item(&self, cart_item_id: &str) -> Result<()> {
        let options = RequestOptions::delete()
            .with_json(&serde_json::json!({ "device_token": self.client.device_token()? }))?
            .unauthenticated();
        self.client
            .request(&format!("/public/cart/{cart_item_id}"), options)
            .await?;
        Ok(())
    }

    async fn write(&self, endpoint: &str, item: &CartInput) -> Result<()> {
        let body = DeviceScoped {
            body: item,
            device_token: self.client.device_token()?,
        };
        let options = RequestOptions::post().with_json(&body)?.unauthenticated();
        self.client.request(endpoint, options).await?;
        Ok(())
    }
}
