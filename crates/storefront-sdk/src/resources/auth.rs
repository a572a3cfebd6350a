//! Sign-in, registration and sign-out

use crate::client::{ApiClient, RequestOptions, TURNSTILE_HEADER};
use crate::error::Result;
use crate::query::with_query;
use crate::schema::{LoginBody, LoginResponse, RegisterBody, Registration};
use crate::validate::Validate;

pub struct Auth<'a> {
    client: &'a ApiClient,
}

impl<'a> Auth<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token pair. Persisting the result is up to
    /// the caller, e.g. `SessionStore::set_auth_data(login.credentials(), ..)`.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        turnstile_token: &str,
    ) -> Result<LoginResponse> {
        let body = LoginBody {
            username,
            password,
            tenant: self.client.tenant(),
        };
        let options = RequestOptions::post()
            .with_header(TURNSTILE_HEADER, turnstile_token)
            .with_json(&body)?
            .unauthenticated();
        self.client.fetch("/public/auth/login", options).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<LoginResponse> {
        if let Some(address) = &registration.address {
            address.validate()?;
        }
        let endpoint = with_query(
            "/public/auth/register",
            &[("tenant", self.client.tenant())],
        )?;
        let options = RequestOptions::post()
            .with_header(TURNSTILE_HEADER, registration.turnstile_token.as_str())
            .with_json(&RegisterBody::new(registration))?
            .unauthenticated();
        self.client.fetch(&endpoint, options).await
    }

    /// Invalidate the session server-side. Local tokens are left to the caller.
    pub async fn logout(&self) -> Result<()> {
        self.client.request("/logout", RequestOptions::post()).await?;
        Ok(())
    }
}
