//! Token refresh call
//!
//! Exchanges the stored refresh token for a new access/refresh pair. The call
//! goes through the pipeline as an unauthenticated request, so tenant and
//! device headers are still attached and the executor's retry policy applies,
//! but a 401 from the refresh endpoint never triggers another refresh.

use storefront_auth::{REFRESH_PATH, RefreshRequest, TokenPair, refresh_url};

use crate::client::{ApiClient, RequestOptions};
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct TokenRefresher {
    url: String,
}

impl TokenRefresher {
    pub fn new(auth_url: &str) -> Self {
        Self {
            url: refresh_url(auth_url),
        }
    }

    /// Absolute URL of the refresh endpoint.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether `url` addresses a refresh endpoint.
    ///
    /// Matches the configured refresh URL and any other URL whose path ends
    /// in `/refresh`, so a 401 from either is returned as-is.
    pub fn is_refresh_endpoint(&self, url: &str) -> bool {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let path = path.trim_end_matches('/');
        path == self.url || path.ends_with(REFRESH_PATH)
    }

    /// Call the refresh endpoint.
    ///
    /// Every failure is reported as `Error::Refresh`; a non-2xx answer keeps
    /// its status and body in the message.
    pub async fn refresh(
        &self,
        client: &ApiClient,
        refresh_token: Option<&str>,
    ) -> Result<TokenPair> {
        let refresh = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Refresh("no refresh token available".into()))?;

        let options = RequestOptions::post()
            .with_json(&RefreshRequest { refresh })
            .map_err(|e| Error::Refresh(e.to_string()))?
            .unauthenticated();

        let response = client
            .send_once(&self.url, options)
            .await
            .map_err(|e| match e {
                Error::Http { status, body, .. } => {
                    Error::Refresh(format!("refresh endpoint returned {status}: {body}"))
                }
                other => Error::Refresh(other.to_string()),
            })?;

        let text = response
            .text()
            .await
            .map_err(|e| Error::Refresh(format!("reading refresh response: {e}")))?;
        serde_json::from_str(&text)
            .map_err(|e| Error::Refresh(format!("malformed refresh response: {e}")))
    }
}
