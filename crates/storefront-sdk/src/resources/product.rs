//! Products, reviews and favorites

use serde::Serialize;
use tracing::debug;

use crate::client::{ApiClient, RequestOptions};
use crate::error::Result;
use crate::query::{Paging, with_query};
use crate::schema::{
    FavoriteInput, FavoriteList, Product, ProductList, ProductQuery, ReviewInput, ReviewList,
};

pub struct Products<'a> {
    client: &'a ApiClient,
}

impl<'a> Products<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, product_id: &str, lang: &str) -> Result<Product> {
        let endpoint = with_query(&format!("/product/{product_id}"), &[("lang", lang)])?;
        self.client.fetch(&endpoint, RequestOptions::get()).await
    }

    pub async fn query(&self, query: &ProductQuery) -> Result<ProductList> {
        let endpoint = with_query("/public/product", query)?;
        self.client.fetch(&endpoint, RequestOptions::get()).await
    }

    /// Submit a rating. The backend's answer is returned undecoded.
    pub async fn review(&self, product_id: &str, review: &ReviewInput) -> Result<serde_json::Value> {
        let options = RequestOptions::post().with_json(review)?;
        self.client
            .fetch(&format!("/product/{product_id}/rating"), options)
            .await
    }

    pub async fn query_reviews(&self, product_id: &str, page: u32, size: u32) -> Result<ReviewList> {
        let endpoint = with_query(
            &format!("/product/{product_id}/rating"),
            &Paging::new(page, size),
        )?;
        self.client.fetch(&endpoint, RequestOptions::get()).await
    }

    pub fn favorites(&self) -> Favorites<'a> {
        Favorites {
            client: self.client,
        }
    }
}

/// The signed-in customer's favorite products.
pub struct Favorites<'a> {
    client: &'a ApiClient,
}

#[derive(Serialize)]
struct FavoriteQuery<'a> {
    page: u32,
    size: u32,
    locale: &'a str,
    sort_by: &'static str,
}

impl Favorites<'_> {
    /// Newest first.
    pub async fn query(&self, page: u32, size: u32, locale: &str) -> Result<FavoriteList> {
        let endpoint = with_query(
            "/product/favorite",
            &FavoriteQuery {
                page,
                size,
                locale,
                sort_by: "created_at",
            },
        )?;
        self.client.fetch(&endpoint, RequestOptions::get()).await
    }

    pub async fn add(&self, product_id: &str, body: &FavoriteInput) -> Result<()> {
        let options = RequestOptions::post().with_json(body)?;
        self.client
            .request(&format!("/product/{product_id}/favorite"), options)
            .await?;
        Ok(())
    }

    pub async fn delete(
        &self,
        product_id: &str,
        favorite_id: &str,
        body: &FavoriteInput,
    ) -> Result<()> {
        let options = RequestOptions::delete().with_json(body)?;
        self.client
            .request(
                &format!("/product/{product_id}/favorite/{favorite_id}"),
                options,
            )
            .await?;
        Ok(())
    }

    /// Favorite id of `product_id`, or `None` if it isn't a favorite.
    ///
    /// Any failure, including transport errors, reads as "not a favorite".
    pub async fn get(&self, product_id: &str, locale: &str) -> Option<String> {
        let endpoint =
            with_query(&format!("/product/{product_id}/favorite"), &[("locale", locale)]).ok()?;
        match self
            .client
            .fetch::<serde_json::Value>(&endpoint, RequestOptions::get())
            .await
        {
            Ok(body) => body.get("id").and_then(|id| id.as_str()).map(str::to_owned),
            Err(e) => {
                debug!(product_id, error = %e, "favorite lookup failed, treating as absent");
                None
            }
        }
    }
}
