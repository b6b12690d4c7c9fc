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
use crate::entities::favourite::{self, Entity as FavouriteEntity};
use crate::middleware::auth::{auth_middleware, CurrentUser};
use crate::problem::ApiError;

//ROUTERS
pub fn favourite_routes() -> Router {
    Router::new()
        .route("/favourites", get(get_favourites).post(add_to_favourites))
        .route("/favourites/:product_id", delete(remove_from_favourites))
        .layer(from_fn(auth_middleware))
}

//Routes
async fn add_to_favourites(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(catalog): Extension<CatalogService>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<AddFavouriteRequest>,
) -> Result<(StatusCode, Json<FavouriteResponse>), ApiError> {
    info!(
        username = %user.username,
        product_id = ?payload.product_id,
        "Received request to add product to favourites"
    );
    payload.validate()?;

    let product_id = payload.product_id.unwrap_or_default();

    catalog.get_product(product_id).await?;

    let txn = db.begin().await?;

    if FavouriteEntity::exists_for_user_and_product(&txn, user.id, product_id).await? {
        return Err(ApiError::FavouriteAlreadyExists(product_id));
    }

    let new_favourite = favourite::ActiveModel {
        user_id: Set(user.id),
        product_id: Set(product_id),
        ..Default::default()
    };

    let saved = new_favourite.insert(&txn).await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(FavouriteResponse {
            id: saved.id,
            user_id: saved.user_id,
            product_id: saved.product_id,
            message: "Product added to favourites successfully".to_owned(),
        }),
    ))
}

async fn get_favourites(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(catalog): Extension<CatalogService>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<Vec<ProductDto>>, ApiError> {
    info!(username = %user.username, "Received request to get user favourites");

    let stored = FavouriteEntity::find_by_user(&*db, user.id).await?;

    let mut products = Vec::new();
    for entry in stored {
        match catalog.get_product(entry.product_id).await {
            Ok(product) => products.push(product),
            Err(CatalogError::NotFound(product_id)) => {
                warn!(product_id, "Favourite product no longer exists, dropping from response");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(Json(products))
}

async fn remove_from_favourites(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(user): Extension<CurrentUser>,
    Path(product_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    info!(
        username = %user.username,
        product_id,
        "Received request to remove product from favourites"
    );

    let txn = db.begin().await?;
    FavouriteEntity::delete_for_user_and_product(&txn, user.id, product_id).await?;
    txn.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}

//structs
#[derive(Deserialize, Clone, Debug, Validate)]
#[serde(rename_all = "camelCase")]
struct AddFavouriteRequest {
    #[validate(required(message = "Product ID is required"))]
    product_id: Option<i64>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FavouriteResponse {
    id: i32,
    user_id: i32,
    product_id: i64,
    message: String,
}
