//! Login and registration bodies

use serde::{Deserialize, Serialize};
use storefront_auth::Credentials;

use super::customer::{Address, AddressInput, Customer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub create_at: String,
    pub enabled: bool,
    pub tenant: String,
    pub tenant_languages: Vec<String>,
    pub attributes: UserAttributes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAttributes {
    #[serde(default)]
    pub permission_id: Vec<String>,
    #[serde(default)]
    pub job_title: Vec<String>,
    #[serde(default)]
    pub local: Vec<String>,
}

/// Answer of login and registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub access_token_expiration: u64,
    pub refresh_token_expiration: u64,
    pub user: AuthUser,
    pub customer: Customer,
    #[serde(default)]
    pub address: Option<Address>,
}

impl LoginResponse {
    /// Credentials to hand to the session store.
    pub fn credentials(&self) -> Credentials {
        let mut credentials = Credentials::new(&self.access_token, &self.refresh_token);
        credentials.access_token_expiration = Some(self.access_token_expiration);
        credentials.refresh_token_expiration = Some(self.refresh_token_expiration);
        credentials
    }
}

/// Account registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub turnstile_token: String,
    pub address: Option<AddressInput>,
    pub languages: String,
    pub locale: String,
    pub permission_id: String,
    pub job_title: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub tenant: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterBody<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    /// The email doubles as the username
    pub username: &'a str,
    pub languages: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<&'a AddressInput>,
    pub attributes: RegisterAttributes<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisterAttributes<'a> {
    pub permission_id: &'a str,
    pub job_title: &'a str,
    pub profile_pic: [&'a str; 1],
    pub locale: &'a str,
}

impl<'a> RegisterBody<'a> {
    pub fn new(registration: &'a Registration) -> Self {
        Self {
            first_name: &registration.first_name,
            last_name: &registration.last_name,
            email: &registration.email,
            password: &registration.password,
            username: &registration.email,
            languages: &registration.languages,
            address: registration.address.as_ref(),
            attributes: RegisterAttributes {
                permission_id: &registration.permission_id,
                job_title: &registration.job_title,
                profile_pic: [""],
                locale: &registration.locale,
            },
        }
    }
}
