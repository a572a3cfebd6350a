//! Storefront session credentials
//!
//! Holds the credential types shared between the request pipeline and the
//! application: the `CredentialStore` trait the pipeline reads tokens through,
//! a ready-made `SessionStore` (in memory or backed by a JSON token cache),
//! and the wire types of the token refresh endpoint.
//!
//! Credential flow:
//! 1. Application logs in and calls `SessionStore::set_auth_data()`
//! 2. Pipeline reads the bearer token via `CredentialStore::access_token()`
//! 3. On a 401 the pipeline posts a `RefreshRequest` to `refresh_url()`
//! 4. The new `TokenPair` is written back via `CredentialStore::set_tokens()`

pub mod constants;
pub mod credentials;
pub mod error;
pub mod token;

pub use constants::*;
pub use credentials::{CredentialStore, Credentials, SessionState, SessionStore};
pub use error::{Error, Result};
pub use token::{RefreshRequest, TokenPair, refresh_url};
