//! Request-body constraints checked before any network call

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// E.164: `+`, a non-zero digit, then 1 to 14 more digits.
static E164: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").expect("valid regex"));

/// Bodies that carry constraints the backend would otherwise reject.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn is_e164(phone: &str) -> bool {
    E164.is_match(phone)
}

pub(crate) fn require_e164(field: &str, phone: &str) -> Result<()> {
    if is_e164(phone) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "{field} must be an E.164 phone number, got {phone:?}"
        )))
    }
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::Validation(format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}

pub(crate) fn require_uuid(field: &str, value: &str) -> Result<()> {
    uuid::Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| Error::Validation(format!("{field} must be a UUID, got {value:?}")))
}
