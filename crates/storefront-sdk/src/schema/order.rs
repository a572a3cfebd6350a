//! Order, checkout and shipping bodies

use serde::{Deserialize, Serialize};

use super::Page;
use super::catalog::Product;
use crate::error::{Error, Result};
use crate::validate::{Validate, require_e164, require_non_empty, require_uuid};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub cart_id: Option<String>,
    pub product_id: String,
    pub product_attribute_id: Option<String>,
    pub price: f64,
    pub price_updated_at: String,
    pub quantity: u32,
    pub notes: String,
    pub created_at: String,
    /// Present when listing with `include_products=true`
    #[serde(default)]
    pub product: Option<Product>,
}

/// A step of the order workflow; `extra` is backend-defined JSON text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStep {
    pub id: String,
    pub order_id: String,
    pub kind: String,
    pub extra: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: String,
    pub customer_id: String,
    pub address_id: String,
    pub currency: String,
    pub total_price: f64,
    pub total_paid: f64,
    pub created_at: String,
    pub payment_id: String,
    pub payment_provider: String,
    pub payment_status: String,
    pub payment_created_at: String,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPayment {
    pub id: String,
    pub order_id: String,
    pub status: i32,
    pub provider: String,
    pub amount: f64,
    pub created_at: String,
    pub provider_extra_information: PaymentSession,
}

/// Hosted checkout session of the payment provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSession {
    pub id: String,
    pub payment_id: String,
    pub url: String,
    pub payment_status: String,
    pub session_status: String,
    pub session_expires_at: i64,
    pub session_created_at: i64,
}

/// Answer of order create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithPayment {
    pub order: OrderRecord,
    pub payment: OrderPayment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: String,
    pub number: String,
    pub customer_id: String,
    pub currency: String,
    pub total_price: f64,
    pub total_paid: f64,
    pub created_at: String,
    pub payment_id: String,
    pub payment_provider: String,
    pub payment_status: String,
    pub payment_created_at: String,
    #[serde(default)]
    pub items_count: Option<u32>,
    pub current_step: OrderStep,
    #[serde(default)]
    pub items: Option<Vec<OrderItem>>,
}

pub type OrderList = Page<OrderSummary>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: String,
    pub number: String,
    pub customer_id: String,
    pub address_id: String,
    pub currency: String,
    pub total_price: f64,
    pub total_paid: f64,
    pub shipment_service_code: String,
    pub shipment_price: f64,
    pub created_at: String,
    pub payment_id: String,
    pub payment_provider: String,
    pub payment_status: String,
    pub payment_created_at: String,
    pub items_count: u32,
    pub current_step: OrderStep,
    pub logs: Vec<OrderStep>,
    pub items: Vec<OrderItem>,
}

/// Order listing filters.
#[derive(Debug, Clone, Serialize)]
pub struct OrderQuery {
    pub page: u32,
    pub size: u32,
    pub include_products: bool,
    pub locale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
}

impl OrderQuery {
    /// First page of 10, products included.
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            page: 1,
            size: 10,
            include_products: true,
            locale: locale.into(),
            status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartRef {
    pub cart_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentChoice {
    pub provider: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipmentProvider {
    #[serde(rename = "canada-post")]
    CanadaPost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentChoice {
    pub service_code: String,
    pub provider: ShipmentProvider,
}

/// Body of an authenticated checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrder {
    pub locale: String,
    pub address_id: Option<String>,
    pub payment: PaymentChoice,
    pub items: Vec<CartRef>,
    pub shipment: ShipmentChoice,
}

/// Body of an order update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateOrder {
    pub status: i32,
    pub tax: f64,
    pub discount: f64,
    pub delivery_amount: f64,
    pub final_amount: f64,
    pub payment_method_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Stripe,
    Zaincash,
    Switchpayment,
    Pos,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestPayment {
    pub provider: PaymentProvider,
    /// Required for point-of-sale payments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_transaction_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestShipment {
    pub service_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestCustomer {
    pub firstname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    pub language: String,
    pub phonenumber: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GuestAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    pub phonenumber: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// Body of a guest (point-of-sale or anonymous) checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGuestOrder {
    pub api_key: String,
    pub branch_id: String,
    pub locale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<GuestPayment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipment: Option<GuestShipment>,
    pub items: Vec<CartRef>,
    pub customer: GuestCustomer,
    pub customer_address: GuestAddress,
}

impl Validate for CreateGuestOrder {
    fn validate(&self) -> Result<()> {
        require_non_empty("api_key", &self.api_key)?;
        require_uuid("branch_id", &self.branch_id)?;
        require_non_empty("locale", &self.locale)?;
        if let Some(address_id) = &self.address_id {
            require_uuid("address_id", address_id)?;
        }
        if let Some(payment) = &self.payment {
            if payment.provider == PaymentProvider::Pos && payment.payment_transaction_id.is_none()
            {
                return Err(Error::Validation(
                    "payment_transaction_id is required when provider is 'pos'".into(),
                ));
            }
        }
        if self.items.is_empty() {
            return Err(Error::Validation("at least one item is required".into()));
        }
        for item in &self.items {
            require_uuid("items.cart_id", &item.cart_id)?;
        }
        require_non_empty("customer.firstname", &self.customer.firstname)?;
        require_non_empty("customer.language", &self.customer.language)?;
        require_e164("customer.phonenumber", &self.customer.phonenumber)?;
        if let Some(email) = &self.customer.email {
            if !email.contains('@') {
                return Err(Error::Validation(format!(
                    "customer.email is not an email address: {email:?}"
                )));
            }
        }
        require_e164(
            "customer_address.phonenumber",
            &self.customer_address.phonenumber,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchOrder {
    pub id: String,
    pub branch_id: String,
    pub order_id: String,
    pub approved: bool,
    pub driver_id: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestOrder {
    pub id: String,
    pub number: String,
    pub customer_id: String,
    pub address_id: String,
    pub currency: String,
    pub total_price: f64,
    pub total_paid: f64,
    pub shipment_price: f64,
    pub federal_tax: f64,
    pub province_tax: f64,
    pub created_at: String,
    pub items_count: u32,
    pub current_step: OrderStep,
    pub logs: Vec<OrderStep>,
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestOrderResponse {
    #[serde(default)]
    pub branch_order: Option<BranchOrder>,
    pub order: GuestOrder,
    #[serde(default)]
    pub payment: Option<serde_json::Value>,
}

/// Where a shipping quote is requested for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingDestination {
    pub postal_code: String,
    pub country_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParcelDimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ShippingRateRequest<'a> {
    pub destination: &'a ShippingDestination,
    pub dimensions_cm: ParcelDimensions,
    pub weight_kg: f64,
}

impl<'a> ShippingRateRequest<'a> {
    /// Quotes use a fixed nominal parcel.
    pub fn nominal(destination: &'a ShippingDestination) -> Self {
        Self {
            destination,
            dimensions_cm: ParcelDimensions {
                length: 1.1,
                width: 1.1,
                height: 1.1,
            },
            weight_kg: 1.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingRate {
    pub name: String,
    pub code: String,
    pub delivery: DeliveryEstimate,
    pub pricing_details: PricingDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryEstimate {
    pub guaranteed_delivery: bool,
    pub expected_transit_time: u32,
    pub expected_delivery_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingDetails {
    pub base: f64,
    pub taxes: Taxes,
    pub due: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxes {
    pub gst: f64,
    pub pst: f64,
    pub hst: f64,
}
