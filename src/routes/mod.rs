pub mod auth_routes;
pub mod cart_routes;
pub mod favourite_routes;
pub mod product_routes;

use axum::{Extension, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::catalog::CatalogService;

use {
    auth_routes::auth_routes,
    cart_routes::cart_routes,
    favourite_routes::favourite_routes,
    product_routes::product_routes,
};

pub fn api_router(db: Arc<DatabaseConnection>, catalog: CatalogService) -> Router {
    Router::new()
        .nest("/api/auth", auth_routes())
        .nest("/api", product_routes())
        .nest("/api", cart_routes())
        .nest("/api", favourite_routes())
        .layer(Extension(db))
        .layer(Extension(catalog))
}
