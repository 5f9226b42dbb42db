use std::sync::Arc;

use salvo::Depot;
use salvo::http::header::AUTHORIZATION;
use warden_core::constants::ADMIN_ROLE;
use warden_service::auth::{Identity, IdentityResolver, RequestContext};
use warden_service::error::ServiceError;

use crate::error::{AppError, AppResult};
use crate::security_handler::get_resolver_from_depot;

/// ## Summary
/// Authentication middleware that resolves the caller of the request and
/// stores its identity in the depot.
///
/// Resolution is synchronous and may block on storage or the directory, so it
/// runs on the blocking thread pool.
///
/// ## Side Effects
/// Injects the resolved [`Identity`] into the depot for downstream handlers.
///
/// ## Errors
/// Responds 401 if the credentials are rejected, 500 if the resolver is missing.
#[salvo::async_trait]
impl salvo::Handler for AuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        request_id = %uuid::Uuid::now_v7(),
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        // Already resolved for this request.
        if depot.obtain::<Identity>().is_ok() {
            return;
        }

        let authorization = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let resolved = match get_resolver_from_depot(depot) {
            Ok(resolver) => resolve_identity(resolver, authorization).await,
            Err(e) => Err(e),
        };

        match resolved {
            Ok(identity) => {
                tracing::debug!(
                    user_id = %identity.id(),
                    anonymous = identity.is_anonymous(),
                    "Request identity resolved"
                );
                depot.inject(identity);
            }
            Err(e) => {
                e.render(res);
                ctrl.skip_rest();
            }
        }
    }
}

async fn resolve_identity(
    resolver: Arc<IdentityResolver>,
    authorization: Option<String>,
) -> AppResult<Identity> {
    let identity = tokio::task::spawn_blocking(move || {
        let mut ctx = RequestContext::new(authorization);
        resolver.resolve(&mut ctx)
    })
    .await??;
    Ok(identity)
}

/// Middleware handler for identity resolution.
/// Use this as a hoop on routes whose handlers need the caller's identity.
pub struct AuthMiddleware;

/// ## Summary
/// Retrieves the identity resolved by [`AuthMiddleware`].
///
/// ## Errors
/// Returns an error if the middleware did not run for this request.
pub fn get_identity_from_depot(depot: &Depot) -> AppResult<Identity> {
    depot.obtain::<Identity>().cloned().map_err(|_err| {
        AppError::CoreError(warden_core::error::CoreError::InvariantViolation(
            "Identity not found in depot",
        ))
    })
}

/// ## Summary
/// Requires the caller to hold the `administrators` role.
///
/// ## Errors
/// Returns `NotAuthorized` for an anonymous caller (so the client is asked for
/// credentials) and `Forbidden` for an authenticated caller without the role.
pub fn require_admin(depot: &Depot) -> AppResult<Identity> {
    let identity = get_identity_from_depot(depot)?;
    if identity.has_role(ADMIN_ROLE) {
        Ok(identity)
    } else if identity.is_anonymous() {
        Err(ServiceError::NotAuthorized.into())
    } else {
        tracing::warn!(user_id = %identity.id(), "Administrative request without administrators role");
        Err(AppError::Forbidden(
            "administrators role required".to_string(),
        ))
    }
}
