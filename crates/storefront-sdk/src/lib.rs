//! Typed client for the multi-tenant storefront backend
//!
//! Every call flows through one authenticated pipeline:
//! 1. `ApiClient::request()` attaches tenant, device and bearer headers
//! 2. `RequestExecutor` sends it with a timeout and retries transport failures
//! 3. A 401 joins or leads the single in-flight token refresh (`RefreshState`)
//! 4. `TokenRefresher` posts the refresh token, the store receives the new pair
//! 5. The request is replayed once with the new access token
//!
//! `Storefront` bundles the resource clients over one shared pipeline, so all
//! of them share a connection pool and a refresh state.
//!
//! ```no_run
//! # async fn demo() -> storefront_sdk::Result<()> {
//! use std::sync::Arc;
//! use storefront_auth::SessionStore;
//! use storefront_sdk::{ClientConfig, Storefront};
//!
//! let store = Arc::new(SessionStore::load("auth-storage.json".into()).await?);
//! let config = ClientConfig::new("https://api.example.com", "acme")
//!     .with_auth_url("https://api.example.com/auth");
//! let shop = Storefront::with_store(config, store)?;
//! let orders = shop.orders().query(&storefront_sdk::schema::OrderQuery::new("en")).await?;
//! # let _ = orders;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod query;
pub mod refresh;
pub mod refresher;
pub mod resources;
pub mod schema;
pub mod validate;

use std::sync::Arc;

use storefront_auth::CredentialStore;

pub use client::{ApiClient, RequestOptions};
pub use config::{AuthConfig, ClientConfig};
pub use error::{Error, Result};
pub use executor::{RequestDescriptor, RequestExecutor};
pub use refresh::{RefreshState, RefreshTicket};
pub use refresher::TokenRefresher;
pub use resources::*;

/// Entry point bundling every resource client over one pipeline.
#[derive(Debug, Clone)]
pub struct Storefront {
    client: ApiClient,
}

impl Storefront {
    /// Anonymous access: public catalog, tenant info, guest checkout.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
        })
    }

    pub fn with_auth(config: ClientConfig, auth: AuthConfig) -> Result<Self> {
        Ok(Self {
            client: ApiClient::with_auth(config, auth)?,
        })
    }

    /// Authenticated access with the refresh endpoint under `config.auth_url`.
    pub fn with_store(config: ClientConfig, store: Arc<dyn CredentialStore>) -> Result<Self> {
        Ok(Self {
            client: ApiClient::with_store(config, store)?,
        })
    }

    /// The shared pipeline, for endpoints without a typed wrapper.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn auth(&self) -> Auth<'_> {
        Auth::new(&self.client)
    }

    pub fn products(&self) -> Products<'_> {
        Products::new(&self.client)
    }

    pub fn favorites(&self) -> Favorites<'_> {
        self.products().favorites()
    }

    pub fn categories(&self) -> Categories<'_> {
        Categories::new(&self.client)
    }

    pub fn brands(&self) -> Brands<'_> {
        Brands::new(&self.client)
    }

    pub fn branches(&self) -> Branches<'_> {
        Branches::new(&self.client)
    }

    pub fn suppliers(&self) -> Suppliers<'_> {
        Suppliers::new(&self.client)
    }

    pub fn menus(&self) -> Menus<'_> {
        Menus::new(&self.client)
    }

    pub fn tenant(&self) -> Tenants<'_> {
        Tenants::new(&self.client)
    }

    pub fn guest_tokens(&self) -> GuestTokens<'_> {
        GuestTokens::new(&self.client)
    }

    pub fn carts(&self) -> Carts<'_> {
        Carts::new(&self.client)
    }

    pub fn orders(&self) -> Orders<'_> {
        Orders::new(&self.client)
    }

    pub fn customers(&self) -> Customers<'_> {
        Customers::new(&self.client)
    }
}
