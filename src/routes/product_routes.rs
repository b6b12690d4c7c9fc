use axum::{
    extract::{Extension, Path, Query},
    middleware::from_fn,
    routing::get,
    Json, Router,
};
use tracing::info;

use crate::catalog::{CatalogService, ProductDto, ProductListQuery, ProductPage};
use crate::middleware::auth::{auth_middleware, CurrentUser};
use crate::problem::ApiError;

//ROUTERS
pub fn product_routes() -> Router {
    Router::new()
        .route("/products", get(get_products))
        .route("/products/:id", get(get_product))
        .layer(from_fn(auth_middleware))
}

//Routes
async fn get_products(
    Extension(catalog): Extension<CatalogService>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ProductPage>, ApiError> {
    info!(
        username = %user.username,
        limit = ?query.limit,
        skip = ?query.skip,
        "Received request to list products"
    );

    let page = catalog.get_products(&query).await?;
    Ok(Json(page))
}

async fn get_product(
    Extension(catalog): Extension<CatalogService>,
    Extension(user): Extension<CurrentUser>,
    Path(product_id): Path<i64>,
) -> Result<Json<ProductDto>, ApiError> {
    info!(username = %user.username, product_id, "Received request to get product");

    let product = catalog.get_product(product_id).await?;
    Ok(Json(product))
}
