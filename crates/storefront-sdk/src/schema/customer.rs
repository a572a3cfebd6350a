//! Customer and address bodies

use serde::{Deserialize, Serialize};

use super::Page;
use super::de;
use crate::error::Result;
use crate::validate::{Validate, require_e164};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: String,
    pub title: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub address1: String,
    pub address2: String,
    #[serde(deserialize_with = "de::e164")]
    pub phonenumber: String,
    pub is_default: bool,
    pub postal_code: String,
}

/// Body of address create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressInput {
    pub title: String,
    pub country: String,
    pub state: String,
    pub city: String,
    pub address1: String,
    pub address2: String,
    pub phonenumber: String,
    pub is_default: bool,
    pub postal_code: String,
}

impl Validate for AddressInput {
    fn validate(&self) -> Result<()> {
        require_e164("phonenumber", &self.phonenumber)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub external_user_id: String,
    pub firstname: String,
    pub lastname: String,
    pub language: String,
    /// Older accounts carry an empty phone number
    #[serde(deserialize_with = "de::e164_or_empty")]
    pub phonenumber: String,
    pub email: String,
    pub gender: i32,
    pub date_of_birth: Option<String>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub addresses: Vec<Address>,
}

pub type CustomerList = Page<Customer>;

/// Body of customer create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerInput {
    pub external_user_id: String,
    pub firstname: String,
    pub lastname: String,
    pub language: String,
    pub phonenumber: String,
    pub email: String,
    pub gender: i32,
    pub date_of_birth: String,
}

/// Filters for the customer listing.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerQuery {
    pub page: u32,
    pub size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firstname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lastname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Default for CustomerQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: 10,
            firstname: None,
            lastname: None,
            language: None,
        }
    }
}
