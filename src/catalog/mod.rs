pub mod client;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

pub use client::{CatalogClient, CatalogError};
pub use types::{ListingKey, ProductDto, ProductListQuery, ProductPage};

pub const DEFAULT_CACHE_CAPACITY: u64 = 100;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

//Read-through cache in front of the catalog client. Listing and single
//product lookups live in separate cache spaces; neither invalidates the
//other and the catalog itself is never written through this service.
#[derive(Clone)]
pub struct CatalogService {
    client: Arc<CatalogClient>,
    listings: Cache<ListingKey, ProductPage>,
    products: Cache<i64, ProductDto>,
}

impl CatalogService {
    pub fn new(client: CatalogClient, capacity: u64, ttl: Duration) -> Self {
        let listings = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        let products = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();

        Self {
            client: Arc::new(client),
            listings,
            products,
        }
    }

    pub async fn get_products(&self, query: &ProductListQuery) -> Result<ProductPage, CatalogError> {
        let key = query.cache_key();
        self.listings
            .try_get_with(key, self.client.get_products(query))
            .await
            .map_err(unwrap_shared)
    }

    //Only successful lookups are stored. A not-found or unavailable outcome
    //re-queries upstream on the next call, so a transient fault never gets
    //remembered as a missing product.
    pub async fn get_product(&self, product_id: i64) -> Result<ProductDto, CatalogError> {
        self.products
            .try_get_with(product_id, async {
                debug!(product_id, "Product cache miss, querying upstream catalog");
                self.client.get_product(product_id).await
            })
            .await
            .map_err(unwrap_shared)
    }
}

fn unwrap_shared(err: Arc<CatalogError>) -> CatalogError {
    (*err).clone()
}
