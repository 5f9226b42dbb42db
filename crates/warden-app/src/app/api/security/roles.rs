use salvo::writing::Json;
use salvo::{Depot, Request, Router, handler};
use warden_db::model::Role;

use super::users::DeletedResponse;
use super::{path_id, run_blocking};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_admin;
use crate::security_handler::get_service_from_depot;

async fn parse_role(req: &mut Request) -> AppResult<Role> {
    req.parse_json::<Role>()
        .await
        .map_err(|e| AppError::InvalidBody(e.to_string()))
}

/// ## Summary
/// GET /api/security/roles - Lists roles, honouring `$filter` and `$orderby`.
#[handler]
async fn list_roles(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Vec<Role>>> {
    require_admin(depot)?;
    let service = get_service_from_depot(depot)?;
    let filter = req.query::<String>("$filter");
    let order_by = req.query::<String>("$orderby");

    let roles =
        run_blocking(move || service.list_roles(filter.as_deref(), order_by.as_deref())).await?;
    Ok(Json(roles))
}

#[handler]
async fn get_role(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Role>> {
    require_admin(depot)?;
    let service = get_service_from_depot(depot)?;
    let id = path_id(req)?;

    Ok(Json(run_blocking(move || service.get_role(&id)).await?))
}

#[handler]
async fn create_role(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Role>> {
    require_admin(depot)?;
    let service = get_service_from_depot(depot)?;
    let role = parse_role(req).await?;

    Ok(Json(run_blocking(move || service.create_role(role)).await?))
}

/// ## Summary
/// PUT /api/security/roles/{id} - Replaces a role's description and included
/// roles. The id comes from the path.
#[handler]
async fn update_role(req: &mut Request, depot: &mut Depot) -> AppResult<Json<Role>> {
    require_admin(depot)?;
    let service = get_service_from_depot(depot)?;
    let id = path_id(req)?;
    let mut role = parse_role(req).await?;
    role.id = id;

    Ok(Json(run_blocking(move || service.update_role(role)).await?))
}

#[handler]
async fn delete_role(req: &mut Request, depot: &mut Depot) -> AppResult<Json<DeletedResponse>> {
    require_admin(depot)?;
    let service = get_service_from_depot(depot)?;
    let id = path_id(req)?;

    let deleted = id.clone();
    run_blocking(move || service.delete_role(&id)).await?;
    Ok(Json(DeletedResponse { deleted }))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("roles")
        .get(list_roles)
        .post(create_role)
        .push(
            Router::with_path("{id}")
                .get(get_role)
                .put(update_role)
                .delete(delete_role),
        )
}
