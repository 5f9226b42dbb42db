use salvo::writing::Json;
use salvo::{Depot, Router, handler};
use warden_service::auth::Identity;

use crate::error::AppResult;
use crate::middleware::auth::get_identity_from_depot;

/// ## Summary
/// Returns the caller's identity and closed role set as JSON.
/// The identity is the one resolved by the `AuthMiddleware`.
#[handler]
async fn whoami(depot: &mut Depot) -> AppResult<Json<Identity>> {
    get_identity_from_depot(depot).map(Json)
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("whoami").get(whoami)
}
