//! Endpoint wrappers for the catalog, checkout and seller dashboard.
//!
//! Payload shapes belong to the backend, so every call is generic over the
//! caller's type.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::client::ApiClient;
use crate::errors::Error;
use crate::request::{FormPart, RequestOptions};

/// Filters for `GET /products/`.
#[derive(Clone, Debug, Default)]
pub struct ProductQuery {
    pub search: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    pub category_id: Option<u64>,
    /// Backend ordering key, e.g. `-price`.
    pub ordering: Option<String>,
}

impl ProductQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    pub fn in_category(slug: impl Into<String>) -> Self {
        Self {
            category: Some(slug.into()),
            ..Self::default()
        }
    }

    pub fn ordered_by(mut self, ordering: impl Into<String>) -> Self {
        self.ordering = Some(ordering.into());
        self
    }

    pub fn to_query_string(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(format!("search={}", urlencoding::encode(search)));
        }
        if let Some(category) = &self.category {
            pairs.push(format!("category={}", urlencoding::encode(category)));
        }
        if let Some(id) = self.category_id {
            pairs.push(format!("category_id={}", id));
        }
        if let Some(ordering) = &self.ordering {
            pairs.push(format!("ordering={}", urlencoding::encode(ordering)));
        }
        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}

#[derive(Serialize)]
struct NewCategory<'a> {
    name: &'a str,
}

fn product_path(slug: &str) -> String {
    format!("/products/{}/", urlencoding::encode(slug))
}

impl ApiClient {
    pub async fn products<T: DeserializeOwned>(&self, query: &ProductQuery) -> Result<Vec<T>, Error> {
        self.get(&format!("/products/{}", query.to_query_string()))
            .await
    }

    pub async fn product<T: DeserializeOwned>(&self, slug: &str) -> Result<T, Error> {
        self.get(&product_path(slug)).await
    }

    pub async fn trending_products<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        self.get("/products/trending/").await
    }

    pub async fn top_selling_products<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        self.get("/products/top-selling/").await
    }

    pub async fn categories<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        self.get("/categories/").await
    }

    pub async fn create_category<T: DeserializeOwned>(&self, name: &str) -> Result<T, Error> {
        self.fetch(
            "/categories/",
            RequestOptions::post().json(&NewCategory { name })?,
        )
        .await
    }

    pub async fn orders<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        self.get("/orders/").await
    }

    pub async fn place_order<O, T>(&self, order: &O) -> Result<T, Error>
    where
        O: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.fetch("/orders/", RequestOptions::post().json(order)?)
            .await
    }

    pub async fn dashboard_stats<T: DeserializeOwned>(&self) -> Result<T, Error> {
        self.get("/dashboard/stats/").await
    }

    pub async fn dashboard_chart<T: DeserializeOwned>(&self) -> Result<T, Error> {
        self.get("/dashboard/chart/").await
    }

    /// Creates a product (`POST /products/`) or, given a slug, patches it.
    pub async fn save_product<T: DeserializeOwned>(
        &self,
        slug: Option<&str>,
        fields: Vec<FormPart>,
    ) -> Result<T, Error> {
        let (endpoint, options) = match slug {
            Some(slug) => (product_path(slug), RequestOptions::patch()),
            None => ("/products/".to_string(), RequestOptions::post()),
        };
        self.fetch(&endpoint, options.form(fields)).await
    }

    pub async fn delete_product(&self, slug: &str) -> Result<(), Error> {
        self.request::<serde_json::Value>(&product_path(slug), RequestOptions::delete())
            .await?;
        Ok(())
    }
}
