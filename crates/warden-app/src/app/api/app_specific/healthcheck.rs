use salvo::writing::Json;
use salvo::{Depot, Router, handler};
use serde::Serialize;

use crate::error::AppResult;
use crate::security_handler::get_service_from_depot;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    /// Backend serving user and role lookups.
    pub store: &'static str,
    /// Entries in the user cache, expired ones included until swept.
    pub cached_identities: usize,
}

#[handler]
async fn healthcheck(depot: &mut Depot) -> AppResult<Json<Health>> {
    let service = get_service_from_depot(depot)?;
    let resolver = service.resolver();
    Ok(Json(Health {
        status: "OK",
        store: resolver.store().name(),
        cached_identities: resolver.caches().users.len(),
    }))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("healthcheck").get(healthcheck)
}
