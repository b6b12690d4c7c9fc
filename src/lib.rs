pub mod catalog;
pub mod entities;
pub mod middleware;
pub mod problem;
pub mod routes;

use axum::{middleware::from_fn, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_sessions::{cookie::time::Duration, Expiry, MemoryStore, SessionManagerLayer};

use crate::catalog::CatalogService;
use crate::middleware::logging::logging_middleware;
use crate::routes::api_router;

//Everything is built here once and injected; the cache and session store
//have no life outside the router they are attached to.
pub fn create_app(db: Arc<DatabaseConnection>, catalog: CatalogService) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(Duration::hours(24)));

    api_router(db, catalog)
        .layer(session_layer)
        .layer(from_fn(logging_middleware))
}
