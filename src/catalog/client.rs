use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use tracing::warn;

use crate::catalog::types::{ProductDto, ProductListQuery, ProductPage};

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug, Clone)]
pub enum CatalogError {
    #[error("Product not found with id: {0}")]
    NotFound(i64),
    #[error("Product catalog is unavailable: {0}")]
    Unavailable(String),
}

//Thin client over the upstream catalog. Timeouts and transport faults all
//collapse into Unavailable; retrying (if ever) is the caller's business.
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(UPSTREAM_TIMEOUT)
            .build()
            .expect("Failed to build upstream HTTP client");

        Self { http, base_url }
    }

    pub async fn get_products(&self, query: &ProductListQuery) -> Result<ProductPage, CatalogError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(skip) = query.skip {
            params.push(("skip", skip.to_string()));
        }
        if let Some(sort_by) = &query.sort_by {
            params.push(("sortBy", sort_by.clone()));
        }
        if let Some(order) = &query.order {
            params.push(("order", order.clone()));
        }

        let response = self
            .http
            .get(format!("{}/products", self.base_url))
            .query(&params)
            .send()
            .await
            .map_err(|err| CatalogError::Unavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Upstream catalog returned non-success for product listing");
            return Err(CatalogError::Unavailable(format!(
                "Upstream catalog returned {status} for product listing"
            )));
        }

        response
            .json::<ProductPage>()
            .await
            .map_err(|err| CatalogError::Unavailable(format!("Malformed upstream response: {err}")))
    }

    pub async fn get_product(&self, product_id: i64) -> Result<ProductDto, CatalogError> {
        let response = self
            .http
            .get(format!("{}/products/{}", self.base_url, product_id))
            .send()
            .await
            .map_err(|err| CatalogError::Unavailable(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(product_id));
        }
        if !status.is_success() {
            warn!(status = %status, product_id, "Upstream catalog returned non-success for product");
            return Err(CatalogError::Unavailable(format!(
                "Upstream catalog returned {status} for product {product_id}"
            )));
        }

        response
            .json::<ProductDto>()
            .await
            .map_err(|err| CatalogError::Unavailable(format!("Malformed upstream response: {err}")))
    }
}
