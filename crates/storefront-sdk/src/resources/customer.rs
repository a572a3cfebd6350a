//! Customer profiles and addresses

use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;

use crate::client::{ApiClient, RequestOptions, decode};
use crate::error::Result;
use crate::query::with_query;
use crate::schema::{Address, AddressInput, Customer, CustomerInput, CustomerList, CustomerQuery};
use crate::validate::Validate;

#[derive(Serialize)]
struct NewCustomer<'a> {
    #[serde(flatten)]
    body: &'a CustomerInput,
    /// Assigned by the backend from the tenant header
    tenant_id: Option<String>,
}

pub struct Customers<'a> {
    client: &'a ApiClient,
}

impl<'a> Customers<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Profile of the signed-in user; `None` when the backend answers a 2xx
    /// other than 200. HTTP errors are returned as `Error::Http`.
    pub async fn get(&self) -> Result<Option<Customer>> {
        let result = self
            .client
            .request("/customer/info", RequestOptions::get())
            .await;
        optional_customer(result).await
    }

    /// Profile by auth user id, using an explicit access token instead of the
    /// stored one (e.g. right after registration, before the session is saved).
    pub async fn get_by_user_id(&self, token: &str, user_id: &str) -> Result<Option<Customer>> {
        let options = RequestOptions::get()
            .with_header(AUTHORIZATION.as_str(), format!("Bearer {token}"))
            .unauthenticated();
        let result = self
            .client
            .request(&format!("/customer/userid/{user_id}"), options)
            .await;
        optional_customer(result).await
    }

    /// Create the customer record for a freshly registered user.
    pub async fn create(&self, token: &str, customer: &CustomerInput) -> Result<Customer> {
        let body = NewCustomer {
            body: customer,
            tenant_id: None,
        };
        let options = RequestOptions::post()
            .with_header(AUTHORIZATION.as_str(), format!("Bearer {token}"))
            .with_json(&body)?
            .unauthenticated();
        self.client.fetch("/customer", options).await
    }

    pub async fn update(&self, customer_id: &str, customer: &CustomerInput) -> Result<Customer> {
        let options = RequestOptions::put().with_json(customer)?;
        self.client
            .fetch(&format!("/customer/{customer_id}"), options)
            .await
    }

    pub async fn query(&self, query: &CustomerQuery) -> Result<CustomerList> {
        let endpoint = with_query("/customer", query)?;
        self.client.fetch(&endpoint, RequestOptions::get()).await
    }

    /// Add an address to the signed-in customer.
    pub async fn create_address(&self, address: &AddressInput) -> Result<Address> {
        address.validate()?;
        let customer_id = self.client.customer_id()?;
        let options = RequestOptions::post().with_json(address)?;
        self.client
            .fetch(&format!("/customer/{customer_id}/address"), options)
            .await
    }

    pub async fn update_address(
        &self,
        customer_id: &str,
        address_id: &str,
        address: &AddressInput,
    ) -> Result<Address> {
        address.validate()?;
        let options = RequestOptions::put().with_json(address)?;
        self.client
            .fetch(
                &format!("/customer/{customer_id}/address/{address_id}"),
                options,
            )
            .await
    }

    pub async fn delete_address(&self, customer_id: &str, address_id: &str) -> Result<()> {
        self.client
            .request(
                &format!("/customer/{customer_id}/address/{address_id}"),
                RequestOptions::delete(),
            )
            .await?;
        Ok(())
    }
}

/// A 200 decodes into the customer; any other 2xx means "no profile".
/// Non-2xx answers were already turned into `Error::Http` by the pipeline.
async fn optional_customer(result: Result<reqwest::Response>) -> Result<Option<Customer>> {
    let response = result?;
    if response.status() == StatusCode::OK {
        decode(response).await.map(Some)
    } else {
        Ok(None)
    }
}
