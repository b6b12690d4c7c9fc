use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;

use rust_storefront::catalog::{CatalogClient, CatalogService, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
use rust_storefront::create_app;
use rust_storefront::entities::setup_schema;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_storefront=info".into()),
        )
        .init();

    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let upstream_url =
        std::env::var("UPSTREAM_URL").unwrap_or_else(|_| "https://dummyjson.com".to_owned());
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_owned());

    let db: DatabaseConnection = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");
    setup_schema(&db).await;

    let catalog = CatalogService::new(
        CatalogClient::new(upstream_url),
        DEFAULT_CACHE_CAPACITY,
        DEFAULT_CACHE_TTL,
    );

    let app = create_app(Arc::new(db), catalog);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!("Running at {:?}", listener);
    axum::serve(listener, app).await.expect("Server failed");
}
