use std::sync::Arc;

use salvo::async_trait;
use warden_core::error::CoreError;
use warden_service::auth::{IdentityResolver, SecurityService};

use crate::error::AppResult;

/// Injects the shared security administration service (and through it the
/// identity resolver) into every request.
pub struct SecurityServiceHandler {
    pub service: Arc<SecurityService>,
}

#[async_trait]
impl salvo::Handler for SecurityServiceHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(Arc::clone(&self.service));
    }
}

/// ## Summary
/// Retrieves the security administration service from the depot.
///
/// ## Errors
/// Returns an error if the service is not found in the depot.
pub fn get_service_from_depot(depot: &salvo::Depot) -> AppResult<Arc<SecurityService>> {
    depot
        .obtain::<Arc<SecurityService>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Security service not found in depot").into())
}

/// ## Summary
/// Retrieves the identity resolver from the depot.
///
/// ## Errors
/// Returns an error if the security service is not found in the depot.
pub fn get_resolver_from_depot(depot: &salvo::Depot) -> AppResult<Arc<IdentityResolver>> {
    get_service_from_depot(depot).map(|service| Arc::clone(service.resolver()))
}
