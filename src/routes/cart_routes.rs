use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    middleware::from_fn,
    routing::{delete, get},
    Json, Router,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::catalog::{CatalogError, CatalogService, ProductDto};
use crate::entities::cart_item::{self, Entity as CartItemEntity};
use crate::middleware::auth::{auth_middleware, CurrentUser};
use crate::problem::ApiError;

//ROUTERS
pub fn cart_routes() -> Router {
    Router::new()
        .route("/cart", get(get_cart).post(add_to_cart))
        .route("/cart/:product_id", delete(remove_from_cart))
        .layer(from_fn(auth_middleware))
}

//Routes
async fn add_to_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(catalog): Extension<CatalogService>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartItemResponse>), ApiError> {
    info!(
        username = %user.username,
        product_id = ?payload.product_id,
        quantity = ?payload.quantity,
        "Received request to add product to cart"
    );
    payload.validate()?;

    let product_id = payload.product_id.unwrap_or_default();
    let quantity = payload.quantity.unwrap_or(1);

    //Product truth lives upstream; a missing product is a 404, an unreachable
    //catalog is a technical failure. Neither is retried here.
    catalog.get_product(product_id).await?;

    let txn = db.begin().await?;

    if CartItemEntity::exists_for_user_and_product(&txn, user.id, product_id).await? {
        return Err(ApiError::CartItemAlreadyExists(product_id));
    }

    let new_item = cart_item::ActiveModel {
        user_id: Set(user.id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        ..Default::default()
    };

    let saved = new_item.insert(&txn).await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(CartItemResponse {
            id: saved.id,
            user_id: saved.user_id,
            product_id: saved.product_id,
            quantity: saved.quantity,
            message: "Product added to cart successfully".to_owned(),
        }),
    ))
}

async fn get_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(catalog): Extension<CatalogService>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<CartResponse>, ApiError> {
    info!(username = %user.username, "Received request to get user cart");

    let stored = CartItemEntity::find_by_user(&*db, user.id).await?;

    let mut items = Vec::new();
    for entry in stored {
        match catalog.get_product(entry.product_id).await {
            Ok(product) => items.push(CartProductDto {
                product,
                quantity: entry.quantity,
            }),
            //The catalog dropped this product since it was added; show the
            //still-resolvable subset instead of failing the whole cart.
            Err(CatalogError::NotFound(product_id)) => {
                warn!(product_id, "Cart product no longer exists, dropping from response");
            }
            //Anything else means the catalog is unreachable, which must not
            //be confused with the product being gone.
            Err(err) => return Err(err.into()),
        }
    }

    let total_items: i32 = items.iter().map(|item| item.quantity).sum();
    let total_price: f64 = items
        .iter()
        .map(|item| item.product.price.unwrap_or_default() * f64::from(item.quantity))
        .sum();

    Ok(Json(CartResponse {
        items,
        total_items,
        total_price,
    }))
}

async fn remove_from_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user): Extension<CurrentUser>,
    Path(product_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    info!(username = %user.username, product_id, "Received request to remove product from cart");

    let txn = db.begin().await?;
    CartItemEntity::delete_for_user_and_product(&txn, user.id, product_id).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

//structs
#[derive(Deserialize, Clone, Debug, Validate)]
#[serde(rename_all = "camelCase")]
struct AddToCartRequest {
    #[validate(required(message = "Product ID is required"))]
    product_id: Option<i64>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    quantity: Option<i32>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CartItemResponse {
    id: i32,
    user_id: i32,
    product_id: i64,
    quantity: i32,
    message: String,
}

#[derive(Serialize, Debug)]
struct CartProductDto {
    product: ProductDto,
    quantity: i32,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CartResponse {
    items: Vec<CartProductDto>,
    total_items: i32,
    total_price: f64,
}
