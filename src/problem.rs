use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::catalog::CatalogError;

const PROBLEM_BASE: &str = "https://api.example.com/problems";

//Every failure a client can see, mapped 1:1 to a problem detail body at the
//boundary. Domain failures are raised where they are detected; anything
//unanticipated funnels into Technical.
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    #[error("Request validation failed")]
    Validation(Vec<Violation>),
    #[error("Authentication is required to access this resource")]
    AuthenticationRequired,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("User with username '{0}' was not found")]
    UserNotFound(String),
    #[error("Product not found with id: {0}")]
    ProductNotFound(i64),
    #[error("{0}")]
    UserAlreadyExists(String),
    #[error("Product with id {0} is already in cart")]
    CartItemAlreadyExists(i64),
    #[error("Product with id {0} is already in favourites")]
    FavouriteAlreadyExists(i64),
    #[error("{0}")]
    Technical(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::AuthenticationRequired | ApiError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::UserNotFound(_) | ApiError::ProductNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UserAlreadyExists(_)
            | ApiError::CartItemAlreadyExists(_)
            | ApiError::FavouriteAlreadyExists(_) => StatusCode::CONFLICT,
            ApiError::Technical(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn slug(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation-failure-problem-detail",
            ApiError::AuthenticationRequired | ApiError::InvalidCredentials => {
                "authentication-failed-problem-detail"
            }
            ApiError::UserNotFound(_) => "user-not-found-problem-detail",
            ApiError::ProductNotFound(_) => "product-not-found-problem-detail",
            ApiError::UserAlreadyExists(_) => "user-already-exists-problem-detail",
            ApiError::CartItemAlreadyExists(_) => "cart-item-already-exists-problem-detail",
            ApiError::FavouriteAlreadyExists(_) => "favourite-already-exists-problem-detail",
            ApiError::Technical(_) => "technical-failure-problem-detail",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "Validation Failure Problem Detail",
            ApiError::AuthenticationRequired | ApiError::InvalidCredentials => {
                "Authentication Failed Problem Detail"
            }
            ApiError::UserNotFound(_) => "User Not Found Problem Detail",
            ApiError::ProductNotFound(_) => "Product Not Found Problem Detail",
            ApiError::UserAlreadyExists(_) => "User Already Exists Problem Detail",
            ApiError::CartItemAlreadyExists(_) => "Cart Item Already Exists Problem Detail",
            ApiError::FavouriteAlreadyExists(_) => "Favourite Already Exists Problem Detail",
            ApiError::Technical(_) => "Technical Failure Problem Detail",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ProblemDetail {
            problem_type: format!("{PROBLEM_BASE}/{}", self.slug()),
            title: self.title().to_owned(),
            status: status.as_u16(),
            detail: self.to_string(),
            timestamp: Utc::now(),
            violations: match &self {
                ApiError::Validation(violations) => Some(violations.clone()),
                _ => None,
            },
        };

        let mut response = (status, Json(body)).into_response();
        //Leave the error behind for the logging middleware.
        response.extensions_mut().insert(self);
        response
    }
}

#[derive(Serialize, Debug)]
pub struct ProblemDetail {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<Violation>>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub property_path: String,
    pub rejected_value: Option<String>,
    pub message: String,
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        ApiError::Technical(format!("Database error: {err}"))
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound(product_id) => ApiError::ProductNotFound(product_id),
            CatalogError::Unavailable(message) => ApiError::Technical(message),
        }
    }
}

impl From<tower_sessions::session::Error> for ApiError {
    fn from(err: tower_sessions::session::Error) -> Self {
        ApiError::Technical(format!("Session error: {err}"))
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut violations = Vec::new();
        for (field, field_errors) in errors.field_errors() {
            for err in field_errors.iter() {
                violations.push(Violation {
                    property_path: field.to_string(),
                    rejected_value: err.params.get("value").map(|value| match value {
                        serde_json::Value::String(text) => text.clone(),
                        other => other.to_string(),
                    }),
                    message: err
                        .message
                        .as_ref()
                        .map(|message| message.to_string())
                        .unwrap_or_else(|| err.code.to_string()),
                });
            }
        }
        ApiError::Validation(violations)
    }
}
