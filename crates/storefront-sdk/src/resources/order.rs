//! Orders, checkout and shipping quotes

use crate::client::{ApiClient, RequestOptions, TURNSTILE_HEADER};
use crate::error::Result;
use crate::query::with_query;
use crate::schema::{
    CreateGuestOrder, CreateOrder, GuestOrderResponse, OrderDetail, OrderList, OrderQuery,
    OrderWithPayment, ShippingDestination, ShippingRate, ShippingRateRequest, UpdateOrder,
};
use crate::validate::Validate;

pub struct Orders<'a> {
    client: &'a ApiClient,
}

impl<'a> Orders<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Canada Post quotes for a nominal parcel sent to `destination`.
    pub async fn shipping_rates(
        &self,
        destination: &ShippingDestination,
    ) -> Result<Vec<ShippingRate>> {
        let options =
            RequestOptions::post().with_json(&ShippingRateRequest::nominal(destination))?;
        self.client
            .fetch_checked("/shipping/canada-post/rs/ship/price", options)
            .await
    }

    pub async fn get(&self, order_id: &str) -> Result<OrderDetail> {
        self.client
            .fetch_checked(&format!("/order/{order_id}"), RequestOptions::get())
            .await
    }

    pub async fn create(&self, order: &CreateOrder) -> Result<OrderWithPayment> {
        let options = RequestOptions::post().with_json(order)?;
        self.client.fetch("/order", options).await
    }

    /// Checkout without an account. The body is validated before sending.
    pub async fn create_guest(
        &self,
        order: &CreateGuestOrder,
        turnstile_token: &str,
    ) -> Result<GuestOrderResponse> {
        order.validate()?;
        let options = RequestOptions::post()
            .with_header(TURNSTILE_HEADER, turnstile_token)
            .with_json(order)?
            .unauthenticated();
        self.client.fetch("/public/order", options).await
    }

    pub async fn update(&self, order_id: &str, update: &UpdateOrder) -> Result<OrderWithPayment> {
        let options = RequestOptions::put().with_json(update)?;
        self.client
            .fetch(&format!("/order/{order_id}"), options)
            .await
    }

    pub async fn query(&self, query: &OrderQuery) -> Result<OrderList> {
        let endpoint = with_query("/order", query)?;
        self.client.fetch(&endpoint, RequestOptions::get()).await
    }

    pub async fn delete(&self, order_id: &str) -> Result<()> {
        self.client
            .request(&format!("/order/{order_id}"), RequestOptions::delete())
            .await?;
        Ok(())
    }
}
