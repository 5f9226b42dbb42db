use std::collections::BTreeSet;

use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};
use serde::Serialize;
use warden_db::model::{NewUser, User};

use super::{path_id, run_blocking};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_admin;
use crate::security_handler::get_service_from_depot;

/// ## Summary
/// User response payload. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Whether the account is validated by the external directory.
    pub directory_account: bool,
    pub role_ids: BTreeSet<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            directory_account: user.password_hash.is_none(),
            id: user.id,
            display_name: user.display_name,
            email: user.email,
            role_ids: user.role_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: String,
}

async fn parse_user(req: &mut Request) -> AppResult<NewUser> {
    req.parse_json::<NewUser>()
        .await
        .map_err(|e| AppError::InvalidBody(e.to_string()))
}

/// ## Summary
/// GET /api/security/users - Lists users, honouring `$filter` and `$orderby`.
///
/// ## Errors
/// 401/403 for non-administrators, 400 for a malformed filter.
#[handler]
async fn list_users(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<UserResponse>>> {
    require_admin(depot)?;
    let service = get_service_from_depot(depot)?;
    let filter = req.query::<String>("$filter");
    let order_by = req.query::<String>("$orderby");

    let users =
        run_blocking(move || service.list_users(filter.as_deref(), order_by.as_deref())).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// ## Summary
/// GET /api/security/users/{id}
#[handler]
async fn get_user(req: &mut Request, depot: &mut Depot) -> AppResult<Json<UserResponse>> {
    require_admin(depot)?;
    let service = get_service_from_depot(depot)?;
    let id = path_id(req)?;

    let user = run_blocking(move || service.get_user(&id)).await?;
    Ok(Json(user.into()))
}

/// ## Summary
/// POST /api/security/users - Creates a user. Without a password the account
/// is directory-backed.
///
/// ## Errors
/// 400 for a malformed body or password, 409 if the id is taken.
#[handler]
async fn create_user(req: &mut Request, depot: &mut Depot) -> AppResult<Json<UserResponse>> {
    require_admin(depot)?;
    let service = get_service_from_depot(depot)?;
    let new_user = parse_user(req).await?;

    let user = run_blocking(move || service.create_user(new_user)).await?;
    Ok(Json(user.into()))
}

/// ## Summary
/// PUT /api/security/users/{id} - Replaces a user. The id comes from the path.
#[handler]
async fn update_user(req: &mut Request, depot: &mut Depot) -> AppResult<Json<UserResponse>> {
    require_admin(depot)?;
    let service = get_service_from_depot(depot)?;
    let id = path_id(req)?;
    let mut new_user = parse_user(req).await?;
    new_user.id = id;

    let user = run_blocking(move || service.update_user(new_user)).await?;
    Ok(Json(user.into()))
}

/// ## Summary
/// DELETE /api/security/users/{id}
#[handler]
async fn delete_user(req: &mut Request, depot: &mut Depot) -> AppResult<Json<DeletedResponse>> {
    require_admin(depot)?;
    let service = get_service_from_depot(depot)?;
    let id = path_id(req)?;

    let deleted = id.clone();
    run_blocking(move || service.delete_user(&id)).await?;
    Ok(Json(DeletedResponse { deleted }))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("users")
        .get(list_users)
        .post(create_user)
        .push(
            Router::with_path("{id}")
                .get(get_user)
                .put(update_user)
                .delete(delete_user),
        )
}
