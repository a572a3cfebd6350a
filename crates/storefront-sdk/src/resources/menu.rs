use crate::client::{ApiClient, RequestOptions};
use crate::error::Result;
use crate::query::{Paging, with_query};
use crate::schema::MenuList;

pub struct Menus<'a> {
    client: &'a ApiClient,
}

impl<'a> Menus<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn query(&self, lang: &str, page: u32, size: u32) -> Result<MenuList> {
        let endpoint = with_query("/public/menu", &Paging::new(page, size).with_lang(lang))?;
        self.client
            .fetch(&endpoint, RequestOptions::get().unauthenticated())
            .await
    }
}
