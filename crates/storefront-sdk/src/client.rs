//! Authenticated request pipeline
//!
//! Every resource call goes through `ApiClient::request()`:
//! 1. Resolve the URL against the configured base URL
//! 2. Attach JSON content type, tenant, caller headers, device id, bearer token
//! 3. Execute with timeout and transport retry
//! 4. On 401 for an authenticated call, join or lead the single-flight
//!    refresh and replay once with the new token
//! 5. Map non-2xx responses to `Error::Http`

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use storefront_auth::CredentialStore;
use tracing::{debug, info, warn};

use crate::config::{AuthConfig, ClientConfig};
use crate::error::{Error, Result};
use crate::executor::{RequestDescriptor, RequestExecutor};
use crate::metrics;
use crate::refresh::{RefreshState, RefreshTicket};
use crate::refresher::TokenRefresher;

/// Tenant identifier header, sent on every request
pub const TENANT_HEADER: &str = "x-api-tenant";
/// Device identifier header, sent when the store has a device token
pub const DEVICE_HEADER: &str = "x-device-id";
/// Bot-protection token header used by login, registration and guest checkout
pub const TURNSTILE_HEADER: &str = "x-turnstile-token";

/// Per-call options.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    /// Extra headers, applied after tenant and before device/bearer headers
    pub headers: Vec<(String, String)>,
    /// JSON body; ignored for GET
    pub body: Option<serde_json::Value>,
    /// Overrides the configured timeout
    pub timeout: Option<Duration>,
    /// Attach the bearer token and allow refresh-on-401
    pub authentication: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: Vec::new(),
            body: None,
            timeout: None,
            authentication: true,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self::method(Method::POST)
    }

    pub fn put() -> Self {
        Self::method(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::method(Method::DELETE)
    }

    pub fn method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serialize `body` as the JSON payload.
    pub fn with_json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| Error::Validation(format!("serializing request body: {e}")))?;
        Ok(self.with_body(value))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn unauthenticated(mut self) -> Self {
        self.authentication = false;
        self
    }
}

struct Inner {
    config: ClientConfig,
    store: Option<Arc<dyn CredentialStore>>,
    executor: RequestExecutor,
    refresher: Option<TokenRefresher>,
    refresh_state: RefreshState,
}

/// Shared pipeline handle. Clones share the connection pool, the credential
/// store and the refresh state.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.config.base_url)
            .field("tenant", &self.inner.config.tenant)
            .field("authenticated", &self.inner.store.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Client without credentials: only tenant headers are sent and 401s
    /// are returned as errors.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::build(config, None)
    }

    /// Client that reads tokens from `auth.store` and refreshes them at
    /// `{auth.auth_url}/refresh`.
    pub fn with_auth(config: ClientConfig, auth: AuthConfig) -> Result<Self> {
        Self::build(config, Some(auth))
    }

    /// Like `with_auth`, taking the auth URL from `config.auth_url`.
    pub fn with_store(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let auth_url = config
            .auth_url
            .clone()
            .ok_or_else(|| Error::Config("auth_url is required when a credential store is attached".into()))?;
        Self::build(config, Some(AuthConfig::new(auth_url, store)))
    }

    fn build(config: ClientConfig, auth: Option<AuthConfig>) -> Result<Self> {
        config.validate()?;
        if let Some(auth) = &auth {
            if !auth.auth_url.starts_with("http://") && !auth.auth_url.starts_with("https://") {
                return Err(Error::Config(format!(
                    "auth_url must start with http:// or https://, got: {}",
                    auth.auth_url
                )));
            }
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("building HTTP client: {e}")))?;
        let executor = RequestExecutor::new(http, config.retries, config.retry_delay());
        let (store, refresher) = match auth {
            Some(auth) => (Some(auth.store), Some(TokenRefresher::new(&auth.auth_url))),
            None => (None, None),
        };

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                store,
                executor,
                refresher,
                refresh_state: RefreshState::new(),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn tenant(&self) -> &str {
        &self.inner.config.tenant
    }

    pub fn store(&self) -> Option<&Arc<dyn CredentialStore>> {
        self.inner.store.as_ref()
    }

    pub fn refresh_state(&self) -> &RefreshState {
        &self.inner.refresh_state
    }

    /// Device token from the credential store.
    pub fn device_token(&self) -> Result<String> {
        self.store()
            .and_then(|s| s.device_token())
            .ok_or_else(|| Error::Validation("no device token available".into()))
    }

    /// Customer id of the signed-in user.
    pub fn customer_id(&self) -> Result<String> {
        self.store()
            .and_then(|s| s.customer_id())
            .ok_or_else(|| Error::Validation("no signed-in customer".into()))
    }

    /// Run the full pipeline and return the 2xx response.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Response> {
        let mut descriptor = self.describe(endpoint, options)?;
        let response = self.inner.executor.execute(&descriptor).await?;

        if response.status() != StatusCode::UNAUTHORIZED || !self.may_refresh(&descriptor) {
            return ensure_success(response).await;
        }

        debug!(url = %descriptor.url, "401 on authenticated request, refreshing token");
        let token = self.refreshed_token(descriptor.bearer_token()).await?;
        descriptor.set_bearer(&token)?;

        debug!(url = %descriptor.url, "replaying request with refreshed token");
        let replay = self.inner.executor.execute(&descriptor).await?;
        ensure_success(replay).await
    }

    /// `request` with `authentication = false`.
    pub async fn unauthenticated_request(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Response> {
        self.request(endpoint, options.unauthenticated()).await
    }

    /// Run the pipeline and decode the body into `T`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        decode(self.request(endpoint, options).await?).await
    }

    /// Like `fetch`, but a body carrying an `error` field fails with
    /// `Error::Backend` even on 2xx.
    pub async fn fetch_checked<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T> {
        decode_checked(self.request(endpoint, options).await?).await
    }

    /// One execution without refresh handling.
    pub(crate) async fn send_once(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Response> {
        let descriptor = self.describe(endpoint, options)?;
        let response = self.inner.executor.execute(&descriptor).await?;
        ensure_success(response).await
    }

    fn resolve_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_owned()
        } else {
            format!("{}{}", self.inner.config.base_url, endpoint)
        }
    }

    fn describe(&self, endpoint: &str, options: RequestOptions) -> Result<RequestDescriptor> {
        let timeout = options.timeout.unwrap_or_else(|| self.inner.config.timeout());
        let mut descriptor =
            RequestDescriptor::new(options.method, self.resolve_url(endpoint), timeout);
        descriptor.authentication = options.authentication;

        let headers = &mut descriptor.headers;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(TENANT_HEADER),
            header_value(TENANT_HEADER, &self.inner.config.tenant)?,
        );
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Config(format!("invalid header name {name:?}: {e}")))?;
            let value = header_value(name.as_str(), value)?;
            headers.insert(name, value);
        }

        if let Some(store) = &self.inner.store {
            if let Some(device) = store.device_token() {
                headers.insert(
                    HeaderName::from_static(DEVICE_HEADER),
                    header_value(DEVICE_HEADER, &device)?,
                );
            }
            if options.authentication {
                if let Some(token) = store.access_token() {
                    descriptor.set_bearer(&token)?;
                }
            }
        }

        if descriptor.method != Method::GET {
            if let Some(body) = &options.body {
                descriptor.body = Some(
                    serde_json::to_string(body)
                        .map_err(|e| Error::Validation(format!("serializing request body: {e}")))?,
                );
            }
        }

        Ok(descriptor)
    }

    fn may_refresh(&self, descriptor: &RequestDescriptor) -> bool {
        descriptor.authentication
            && self.inner.store.is_some()
            && self
                .inner
                .refresher
                .as_ref()
                .is_some_and(|r| !r.is_refresh_endpoint(&descriptor.url))
    }

    /// Access token to replay with after a 401: shared from an in-flight
    /// refresh, already rotated in the store, or freshly obtained.
    async fn refreshed_token(&self, sent_token: Option<&str>) -> Result<String> {
        let (Some(store), Some(refresher)) = (&self.inner.store, &self.inner.refresher) else {
            return Err(Error::Refresh("no credential store configured".into()));
        };

        match self
            .inner
            .refresh_state
            .try_begin_refresh(sent_token, || store.access_token())
        {
            RefreshTicket::Rotated(token) => {
                debug!("access token rotated since request was sent, replaying");
                Ok(token)
            }
            RefreshTicket::Wait(waiter) => waiter.wait().await,
            RefreshTicket::Lead(leader) => {
                let outcome = self.run_refresh(store.as_ref(), refresher).await;
                leader.complete(outcome.clone());
                outcome
            }
        }
    }

    async fn run_refresh(
        &self,
        store: &dyn CredentialStore,
        refresher: &TokenRefresher,
    ) -> Result<String> {
        let refresh_token = store.refresh_token();
        match refresher.refresh(self, refresh_token.as_deref()).await {
            Ok(pair) => {
                if let Err(e) = store
                    .set_tokens(pair.access_token.clone(), pair.refresh_token)
                    .await
                {
                    warn!(error = %e, "failed to persist refreshed tokens");
                }
                info!(waiters = self.inner.refresh_state.pending(), "access token refreshed");
                metrics::record_refresh("success");
                Ok(pair.access_token)
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed");
                metrics::record_refresh("failure");
                Err(e)
            }
        }
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::Config(format!("invalid value for header {name}: {e}")))
}

/// Pass 2xx through; turn anything else into `Error::Http` with the raw body.
pub async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Http {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("Unknown").to_owned(),
        body,
    })
}

/// Decode a JSON body into `T`; a shape mismatch is `Error::Validation`.
pub async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = read_body(response).await?;
    serde_json::from_str(&text).map_err(|e| shape_error::<T>(e))
}

/// Decode a JSON body, failing with `Error::Backend` when it carries a
/// non-null `error` field.
pub async fn decode_checked<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = read_body(response).await?;
    let value: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| shape_error::<T>(e))?;
    if let Some(error) = value.get("error").filter(|e| !e.is_null()) {
        let message = match error {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(Error::Backend(message));
    }
    serde_json::from_value(value).map_err(|e| shape_error::<T>(e))
}

async fn read_body(response: Response) -> Result<String> {
    response
        .text()
        .await
        .map_err(|e| Error::Transport(format!("reading response body: {e}")))
}

fn shape_error<T>(err: serde_json::Error) -> Error {
    Error::Validation(format!(
        "response does not match {}: {err}",
        std::any::type_name::<T>()
    ))
}
