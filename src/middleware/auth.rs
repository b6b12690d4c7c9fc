use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;
use tower_sessions::Session;
use tracing::warn;

use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::problem::ApiError;

pub const SESSION_USER_KEY: &str = "storefront.username";

//The per-request identity. Resolved once here and handed to handlers as an
//extension, never read from ambient state.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: Role,
}

pub async fn auth_middleware(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    session: Session,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let username: String = session
        .get(SESSION_USER_KEY)
        .await?
        .ok_or(ApiError::AuthenticationRequired)?;

    //Sessions are only minted after a successful lookup, so a missing row
    //here means the user vanished underneath an active session.
    let user = UserEntity::find()
        .filter(user::Column::Username.eq(&username))
        .one(&*db)
        .await?
        .ok_or_else(|| {
            warn!(username = %username, "Session references a user that no longer exists");
            ApiError::UserNotFound(username.clone())
        })?;

    if !user.enabled {
        warn!(username = %username, "Session references a disabled user");
        return Err(ApiError::UserNotFound(username));
    }

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
    });

    Ok(next.run(req).await)
}
