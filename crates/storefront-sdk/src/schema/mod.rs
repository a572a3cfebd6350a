//! Typed request and response bodies
//!
//! Responses decode strictly: a missing required field or a wrong type is an
//! `Error::Validation`, never a silently defaulted value. The few lenient
//! spots are deliberate and live in `de`: nullable lists, the
//! JSON-in-a-string product description and the currency override.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod customer;
pub mod order;

pub use auth::*;
pub use cart::*;
pub use catalog::*;
pub use customer::*;
pub use order::*;

use serde::{Deserialize, Serialize};

/// Currency reported for every catalog price.
pub const CURRENCY: &str = "CAD";

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

/// Serde helpers for the backend's loose spots.
pub(crate) mod de {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    use super::CURRENCY;
    use super::catalog::DescriptionSection;
    use crate::validate::is_e164;

    /// `null` decodes as `T::default()`. Pair with `#[serde(default)]` so a
    /// missing field does too.
    pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// Any currency string decodes as `CAD`.
    pub fn currency<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?;
        Ok(CURRENCY.to_owned())
    }

    /// Section list, either inline or JSON-encoded inside a string.
    pub fn description_sections<'de, D>(
        deserializer: D,
    ) -> Result<Vec<DescriptionSection>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(text) => serde_json::from_str(&text).map_err(|e| {
                D::Error::custom(format!("description string is not a section list: {e}"))
            })?,
            other => other,
        };
        serde_json::from_value(value).map_err(D::Error::custom)
    }

    pub fn e164<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let phone = String::deserialize(deserializer)?;
        if is_e164(&phone) {
            Ok(phone)
        } else {
            Err(D::Error::custom(format!("invalid phone number {phone:?}")))
        }
    }

    /// E.164 or the empty string.
    pub fn e164_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let phone = String::deserialize(deserializer)?;
        if phone.is_empty() || is_e164(&phone) {
            Ok(phone)
        } else {
            Err(D::Error::custom(format!("invalid phone number {phone:?}")))
        }
    }
}
