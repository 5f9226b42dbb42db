use crate::error::ServiceResult;

/// Maps an opaque bearer token to the id of the user it was issued to.
///
/// No token format is assumed. Without a registered resolver, bearer
/// credentials resolve to the anonymous identity.
pub trait BearerTokenResolver: Send + Sync {
    /// ## Summary
    /// Returns the user id the token belongs to, or `None` when the token is
    /// not recognised (the caller is then anonymous).
    ///
    /// ## Errors
    /// Returns an error if the token is rejected or the issuer is unreachable.
    /// Identity resolution treats any error as an authorization failure.
    fn resolve(&self, token: &str) -> ServiceResult<Option<String>>;
}
