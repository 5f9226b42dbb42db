use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};
use serde::{Deserialize, Serialize};
use warden_core::constants::ADMIN_ROLE;
use warden_service::error::ServiceError;

use super::{path_id, run_blocking};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::get_identity_from_depot;
use crate::security_handler::get_service_from_depot;

/// ## Summary
/// Change password request payload
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct ChangePasswordResponse {
    pub user_id: String,
    pub changed: bool,
}

/// ## Summary
/// POST /api/security/users/{id}/password - Changes a user's password.
///
/// Allowed for the user itself and for administrators; the old password is
/// required either way.
///
/// ## Errors
/// 401 for anonymous callers, 403 for other users, 400 when the change is
/// refused or the new password is malformed.
#[handler]
async fn change_password(
    req: &mut Request,
    depot: &mut Depot,
) -> AppResult<Json<ChangePasswordResponse>> {
    let identity = get_identity_from_depot(depot)?;
    let user_id = path_id(req)?;
    if identity.is_anonymous() {
        return Err(ServiceError::NotAuthorized.into());
    }
    if identity.id() != user_id && !identity.has_role(ADMIN_ROLE) {
        tracing::warn!(caller = %identity.id(), user_id = %user_id, "Password change for another user refused");
        return Err(AppError::Forbidden(
            "can only change own password".to_string(),
        ));
    }

    let service = get_service_from_depot(depot)?;
    let body = req
        .parse_json::<ChangePasswordRequest>()
        .await
        .map_err(|e| AppError::InvalidBody(e.to_string()))?;

    let id = user_id.clone();
    run_blocking(move || service.change_password(&id, &body.old_password, &body.new_password))
        .await?;
    Ok(Json(ChangePasswordResponse {
        user_id,
        changed: true,
    }))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("{id}/password").post(change_password)
}
