use crate::client::{ApiClient, RequestOptions};
use crate::error::Result;
use crate::query::{Paging, with_query};
use crate::schema::BranchList;

pub struct Branches<'a> {
    client: &'a ApiClient,
}

impl<'a> Branches<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, page: u32, size: u32) -> Result<BranchList> {
        let endpoint = with_query("/public/branch", &Paging::new(page, size))?;
        self.client
            .fetch(&endpoint, RequestOptions::get().unauthenticated())
            .await
    }
}
