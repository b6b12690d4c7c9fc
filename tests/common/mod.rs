use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use sea_orm::Database;
use serde_json::{json, Value};

use rust_storefront::catalog::{CatalogClient, CatalogService};
use rust_storefront::create_app;
use rust_storefront::entities::setup_schema;

//In-process stand-in for the upstream catalog. Tests can count hits, make
//products disappear (404) or make their lookups blow up (500).
#[derive(Clone, Default)]
pub struct MockCatalog {
    pub hits: Arc<AtomicUsize>,
    gone: Arc<Mutex<HashSet<i64>>>,
    failing: Arc<Mutex<HashSet<i64>>>,
}

impl MockCatalog {
    pub fn hit_count(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn remove_product(&self, product_id: i64) {
        self.gone.lock().expect("gone lock").insert(product_id);
    }

    pub fn break_product(&self, product_id: i64) {
        self.failing.lock().expect("failing lock").insert(product_id);
    }
}

fn sample_product(product_id: i64) -> Option<Value> {
    let (title, price) = match product_id {
        1 => ("iPhone 15", 999.99),
        2 => ("Wireless Mouse", 19.99),
        3 => ("Paperclips", 5.49),
        _ => return None,
    };
    Some(json!({
        "id": product_id,
        "title": title,
        "description": "Test catalog product",
        "category": "general",
        "price": price,
    }))
}

async fn list_products(
    State(state): State<MockCatalog>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let limit: usize = params
        .get("limit")
        .and_then(|value| value.parse().ok())
        .unwrap_or(30);
    let skip: usize = params
        .get("skip")
        .and_then(|value| value.parse().ok())
        .unwrap_or(0);

    let all: Vec<Value> = [1i64, 2, 3]
        .iter()
        .filter_map(|id| sample_product(*id))
        .collect();
    let total = all.len();
    let page: Vec<Value> = all.into_iter().skip(skip).take(limit).collect();

    Json(json!({
        "products": page,
        "total": total,
        "skip": skip,
        "limit": page.len(),
    }))
}

async fn get_product(
    State(state): State<MockCatalog>,
    Path(product_id): Path<i64>,
) -> axum::response::Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    if state
        .failing
        .lock()
        .expect("failing lock")
        .contains(&product_id)
    {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "catalog exploded"})),
        )
            .into_response();
    }

    if state.gone.lock().expect("gone lock").contains(&product_id) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": format!("Product with id '{product_id}' not found")})),
        )
            .into_response();
    }

    match sample_product(product_id) {
        Some(product) => Json(product).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": format!("Product with id '{product_id}' not found")})),
        )
            .into_response(),
    }
}

pub struct TestApp {
    pub address: String,
    pub catalog: MockCatalog,
}

#[allow(dead_code)]
pub async fn spawn_app() -> TestApp {
    spawn_app_with_cache_ttl(Duration::from_secs(600)).await
}

pub async fn spawn_app_with_cache_ttl(cache_ttl: Duration) -> TestApp {
    let catalog_state = MockCatalog::default();
    let mock = Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
        .with_state(catalog_state.clone());

    let mock_listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock catalog listener");
    let mock_addr = mock_listener
        .local_addr()
        .expect("Failed to read mock catalog address");
    tokio::spawn(async move {
        axum::serve(mock_listener, mock)
            .await
            .expect("Mock catalog server failed");
    });

    let db = Database::connect(&format!("sqlite://{}?mode=rwc", db_path()))
        .await
        .expect("Failed to connect to test database");
    setup_schema(&db).await;

    let catalog = CatalogService::new(
        CatalogClient::new(format!("http://{mock_addr}")),
        100,
        cache_ttl,
    );
    let app = create_app(Arc::new(db), catalog);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind app listener");
    let addr = listener.local_addr().expect("Failed to read app address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("App server failed");
    });

    TestApp {
        address: format!("http://{addr}"),
        catalog: catalog_state,
    }
}

fn db_path() -> String {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir()
        .join(format!("storefront-test-{}-{n}.sqlite", std::process::id()))
        .display()
        .to_string()
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build HTTP client")
}

#[allow(dead_code)]
pub async fn register_and_login(client: &reqwest::Client, base: &str, username: &str) {
    let register_payload = json!({
        "username": username,
        "email": format!("{username}@example.com"),
        "password": "password123",
    });

    let response = client
        .post(format!("{base}/api/auth/register"))
        .json(&register_payload)
        .send()
        .await
        .expect("Failed to send register request");
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);

    let login_payload = json!({
        "username": username,
        "password": "password123",
    });

    let response = client
        .post(format!("{base}/api/auth/login"))
        .json(&login_payload)
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}
