mod app_specific;
mod security;

use salvo::Router;

use crate::middleware::auth::AuthMiddleware;

// Re-export route constants from core
pub use warden_core::constants::{
    API_ROUTE_COMPONENT, API_ROUTE_PREFIX, SECURITY_ROUTE_COMPONENT, SECURITY_ROUTE_PREFIX,
};

/// ## Summary
/// Constructs the API router. Every route runs behind [`AuthMiddleware`].
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .hoop(AuthMiddleware)
        .push(app_specific::routes())
        .push(security::routes())
}
