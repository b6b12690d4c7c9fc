use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use axum::{
    extract::Extension,
    http::StatusCode,
    middleware::from_fn,
    routing::{get, post},
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_sessions::Session;
use tracing::info;
use validator::Validate;

use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::middleware::auth::{auth_middleware, CurrentUser, SESSION_USER_KEY};
use crate::problem::ApiError;

//ROUTERS
pub fn auth_routes() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(
            Router::new()
                .route("/me", get(current_user))
                .route_layer(from_fn(auth_middleware)),
        )
}

//Routes
async fn register(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    info!(username = %payload.username, "Received a request to register a new user");
    payload.validate()?;

    let txn = db.begin().await?;

    //Username first, then email. The first match wins and short-circuits.
    if UserEntity::find()
        .filter(user::Column::Username.eq(&payload.username))
        .one(&txn)
        .await?
        .is_some()
    {
        return Err(ApiError::UserAlreadyExists(format!(
            "Username already exists: {}",
            payload.username
        )));
    }

    if UserEntity::find()
        .filter(user::Column::Email.eq(&payload.email))
        .one(&txn)
        .await?
        .is_some()
    {
        return Err(ApiError::UserAlreadyExists(format!(
            "Email already exists: {}",
            payload.email
        )));
    }

    let password = hash_password(&payload.password)
        .map_err(|_| ApiError::Technical("Failed to hash password".to_owned()))?;

    let new_user = user::ActiveModel {
        username: Set(payload.username),
        email: Set(payload.email),
        password: Set(password),
        role: Set(Role::User),
        enabled: Set(true),
        ..Default::default()
    };

    let saved = new_user.insert(&txn).await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::from_user(&saved, "User registered successfully")),
    ))
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    session: Session,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    info!(username = %payload.username, "Received a request to login");
    payload.validate()?;

    //A wrong username and a wrong password are indistinguishable to the
    //caller, so usernames cannot be enumerated through this endpoint.
    let user = UserEntity::find()
        .filter(user::Column::Username.eq(&payload.username))
        .one(&*db)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    user.check_hash(&payload.password)
        .map_err(|_| ApiError::InvalidCredentials)?;

    if !user.enabled {
        return Err(ApiError::InvalidCredentials);
    }

    session.insert(SESSION_USER_KEY, user.username.clone()).await?;

    Ok(Json(AuthResponse::from_user(&user, "Login successful")))
}

async fn current_user(
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<AuthResponse>, ApiError> {
    info!(username = %user.username, "Received a request to get current user");
    Ok(Json(AuthResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
        message: "User retrieved successfully".to_owned(),
    }))
}

//utilities
fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)?
        .to_string();

    Ok(password_hash)
}

//structs
#[derive(Deserialize, Clone, Debug, Validate)]
struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"))]
    username: String,
    #[validate(email(message = "Email must be a valid email address"))]
    email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    password: String,
}

#[derive(Deserialize, Clone, Debug, Validate)]
struct LoginRequest {
    #[validate(length(min = 1, message = "Field username cannot be blank"))]
    username: String,
    #[validate(length(min = 1, message = "Field password cannot be blank"))]
    password: String,
}

#[derive(Serialize, Debug)]
struct AuthResponse {
    id: i32,
    username: String,
    email: String,
    role: Role,
    message: String,
}

impl AuthResponse {
    fn from_user(user: &user::Model, message: &str) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            message: message.to_owned(),
        }
    }
}
