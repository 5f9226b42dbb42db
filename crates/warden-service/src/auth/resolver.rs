//! Cache-then-compute identity resolution.
//!
//! ## Trust window
//!
//! Once a header has been resolved, the `header -> user id` and
//! `user id -> user` entries are trusted until they expire: the credentials are
//! not validated again within the time-to-live. A revoked password or a
//! removed role stays effective for that long unless the affected entries are
//! evicted explicitly, which every administration operation of
//! [`super::SecurityService`] does. Lowering the time-to-live narrows the
//! window at the cost of more validations.

use std::sync::Arc;

use warden_core::config::SecurityConfig;
use warden_core::constants::{
    ADMIN_ROLE, ADMIN_USER, ANONYMOUS_USER, AUTHENTICATED_ROLE, EVERYONE_ROLE,
};
use warden_db::model::User;
use warden_db::store::SecurityStore;

use super::bearer::BearerTokenResolver;
use super::cache::IdentityCaches;
use super::context::RequestContext;
use super::credentials::Credentials;
use super::directory::Directory;
use super::identity::Identity;
use super::roles::RoleExpander;
use super::validate::{CredentialValidator, Validated};
use crate::error::{ServiceError, ServiceResult};

/// Resolves the caller of a request and owns the identity caches.
///
/// Shared by every request; all state is behind the concurrent caches.
pub struct IdentityResolver {
    validator: CredentialValidator,
    caches: IdentityCaches,
    bearer: Option<Arc<dyn BearerTokenResolver>>,
}

impl IdentityResolver {
    #[must_use]
    pub fn new(validator: CredentialValidator, caches: IdentityCaches) -> Self {
        Self {
            validator,
            caches,
            bearer: None,
        }
    }

    #[must_use]
    pub fn from_config(
        config: &SecurityConfig,
        store: Arc<dyn SecurityStore>,
        directory: Option<Arc<dyn Directory>>,
    ) -> Self {
        tracing::info!(
            authorization_ttl = ?config.cache.authorization_ttl(),
            user_ttl = ?config.cache.user_ttl(),
            role_ttl = ?config.cache.role_ttl(),
            store = store.name(),
            directory = directory.as_deref().map(Directory::name),
            "Identity resolver configured"
        );
        Self::new(
            CredentialValidator::new(config.admin_password.clone(), store, directory),
            IdentityCaches::from_config(&config.cache),
        )
    }

    /// Registers the resolver used for bearer credentials.
    #[must_use]
    pub fn with_bearer_resolver(mut self, bearer: Arc<dyn BearerTokenResolver>) -> Self {
        self.bearer = Some(bearer);
        self
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn SecurityStore> {
        self.validator.store()
    }

    #[must_use]
    pub const fn caches(&self) -> &IdentityCaches {
        &self.caches
    }

    /// ## Summary
    /// Resolves the caller of the request owning `ctx`.
    ///
    /// A request resolves at most once: a second call returns the identity
    /// already attached to the context. Unparseable or absent credentials give
    /// the anonymous identity. A cached header is trusted without validating
    /// the credentials again (see the module docs).
    ///
    /// ## Errors
    /// Returns `NotAuthorized` if the credentials are rejected or a storage or
    /// directory failure prevents checking them.
    #[tracing::instrument(skip_all)]
    pub fn resolve(&self, ctx: &mut RequestContext) -> ServiceResult<Identity> {
        if let Some(identity) = ctx.identity() {
            return Ok(identity.clone());
        }

        let Some(header) = ctx.authorization().map(str::to_owned) else {
            return Ok(ctx.attach(Identity::Anonymous));
        };

        if let Some(user) = self.cached(&header) {
            tracing::trace!(user_id = %user.id, "Identity served from cache");
            return Ok(ctx.attach(Identity::User(user)));
        }

        let identity = self.resolve_header(&header)?;
        Ok(ctx.attach(identity))
    }

    fn cached(&self, header: &str) -> Option<Arc<User>> {
        let user_id = self.caches.authorization.get(header)?;
        self.caches.users.get(&user_id)
    }

    fn resolve_header(&self, header: &str) -> ServiceResult<Identity> {
        let Some(credentials) = Credentials::parse(header) else {
            tracing::debug!("Unrecognised authorization header, resolving as anonymous");
            return Ok(Identity::Anonymous);
        };

        let base = match credentials {
            Credentials::Basic { user_id, password } => {
                match self.validator.validate(&user_id, &password)? {
                    Validated::Anonymous => return Ok(Identity::Anonymous),
                    Validated::User(user) => user,
                }
            }
            Credentials::Bearer(token) => match self.resolve_bearer(&token)? {
                Some(user) => user,
                None => return Ok(Identity::Anonymous),
            },
        };

        let user = Arc::new(self.expand(base)?);
        self.caches
            .authorization
            .put(header.to_owned(), user.id.clone());
        self.caches.users.put(user.id.clone(), Arc::clone(&user));

        tracing::info!(user_id = %user.id, roles = ?user.role_ids, "User identified");
        Ok(Identity::User(user))
    }

    fn resolve_bearer(&self, token: &str) -> ServiceResult<Option<User>> {
        let Some(bearer) = &self.bearer else {
            tracing::debug!("Bearer token resolution is not configured, resolving as anonymous");
            return Ok(None);
        };

        let user_id = bearer.resolve(token).map_err(|e| {
            tracing::warn!(error = %e, "Bearer token rejected");
            ServiceError::NotAuthorized
        })?;

        match user_id {
            Some(user_id) if user_id != ANONYMOUS_USER => {
                self.validator.load_user(&user_id).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// ## Summary
    /// Closes the user's role set under inclusion and adds the nominal roles:
    /// the user's own id, `everyone`, `authenticated`, and `administrators` for
    /// the super-user.
    fn expand(&self, mut user: User) -> ServiceResult<User> {
        let stored = std::mem::take(&mut user.role_ids);
        let expander = RoleExpander::new(self.store().roles(), &self.caches.roles);
        let mut roles = expander.expand(stored).map_err(|e| {
            tracing::warn!(user_id = %user.id, error = %e, "Role expansion failed, rejecting credentials");
            ServiceError::NotAuthorized
        })?;

        // Nominal roles are added after the closure and never expanded.
        roles.insert(user.id.clone());
        roles.insert(EVERYONE_ROLE.to_string());
        roles.insert(AUTHENTICATED_ROLE.to_string());
        if user.id == ADMIN_USER {
            roles.insert(ADMIN_ROLE.to_string());
        }
        user.role_ids = roles;
        Ok(user)
    }

    /// Drops the cached identity of `user_id`. The next request presenting any
    /// header for that user validates its credentials again.
    pub fn evict_user(&self, user_id: &str) {
        tracing::debug!(user_id = %user_id, "Evicting cached user");
        self.caches.users.remove(user_id);
    }

    /// Drops the cached role. Identities already cached keep the role set they
    /// were resolved with until they are evicted or expire.
    pub fn evict_role(&self, role_id: &str) {
        tracing::debug!(role_id = %role_id, "Evicting cached role");
        self.caches.roles.remove(role_id);
    }

    pub fn evict_authorization(&self, header: &str) {
        self.caches.authorization.remove(header);
    }

    pub fn clear_caches(&self) {
        self.caches.authorization.clear();
        self.caches.users.clear();
        self.caches.roles.clear();
    }
}
