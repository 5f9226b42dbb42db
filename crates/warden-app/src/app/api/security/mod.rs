//! User and role administration routes under `/api/security`.

use salvo::Router;
use warden_service::error::ServiceResult;

mod password;
mod roles;
mod users;

use warden_core::constants::SECURITY_ROUTE_COMPONENT;

use crate::error::AppResult;

#[must_use]
pub fn routes() -> Router {
    Router::with_path(SECURITY_ROUTE_COMPONENT)
        .push(users::routes().push(password::routes()))
        .push(roles::routes())
}

/// ## Summary
/// Runs a security service call on the blocking thread pool.
///
/// ## Errors
/// Returns the service error, or `TaskFailed` if the task panicked.
async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

/// ## Summary
/// Reads the `{id}` path parameter.
fn path_id(req: &salvo::Request) -> AppResult<String> {
    req.param::<String>("id")
        .ok_or_else(|| crate::error::AppError::InvalidBody("missing id".to_string()))
}
