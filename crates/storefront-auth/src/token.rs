//! Token refresh wire types
//!
//! The backend exchanges a refresh token for a new access/refresh pair at
//! `POST {auth_url}/refresh` with body `{"refresh": "<token>"}` and answers
//! `{"access_token": "...", "refresh_token": "..."}`.

use serde::{Deserialize, Serialize};

use crate::constants::REFRESH_PATH;

/// Body of the refresh call.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

/// Token pair returned by the refresh endpoint.
///
/// Unknown fields (expirations, token type) are ignored; only the two
/// tokens are required.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Build the refresh endpoint URL from the configured auth URL.
pub fn refresh_url(auth_url: &str) -> String {
    format!("{}{}", auth_url.trim_end_matches('/'), REFRESH_PATH)
}
