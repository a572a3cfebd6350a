use crate::client::{ApiClient, RequestOptions};
use crate::error::Result;
use crate::query::{Paging, with_query};
use crate::schema::CategoryList;

pub struct Categories<'a> {
    client: &'a ApiClient,
}

impl<'a> Categories<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn query(&self, lang: &str, page: u32, size: u32) -> Result<CategoryList> {
        let endpoint = with_query("/public/category", &Paging::new(page, size).with_lang(lang))?;
        self.client.fetch(&endpoint, RequestOptions::get()).await
    }
}
