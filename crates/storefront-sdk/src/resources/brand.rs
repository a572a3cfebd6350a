use crate::client::{ApiClient, RequestOptions};
use crate::error::Result;
use crate::query::{Paging, with_query};
use crate::schema::BrandList;

pub struct Brands<'a> {
    client: &'a ApiClient,
}

impl<'a> Brands<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Brand listing; `lang` defaults to `en`.
    pub async fn get(&self, page: u32, size: u32, lang: Option<&str>) -> Result<BrandList> {
        let paging = Paging::new(page, size).with_lang(lang.unwrap_or("en"));
        let endpoint = with_query("/public/brand", &paging)?;
        self.client
            .fetch(&endpoint, RequestOptions::get().unauthenticated())
            .await
    }
}
