//! User and role administration.
//!
//! Every mutation evicts the affected id from the resolver caches so the next
//! resolution sees it. Identities already cached under other ids (a user whose
//! role was edited, for instance) keep their snapshot until they expire.

use std::sync::Arc;

use warden_core::config::SecurityConfig;
use warden_core::constants::{ADMIN_USER, ANONYMOUS_USER};
use warden_db::filter::{FieldMap, ROLE_FIELDS, USER_FIELDS};
use warden_db::model::{NewUser, Role, User};
use warden_db::store::SecurityStore;

use super::password::{PasswordPolicy, hash_password, verify_password};
use super::resolver::IdentityResolver;
use crate::error::{ServiceError, ServiceResult};

const CAN_NOT_CHANGE_PASSWORD: &str = "CAN_NOT_CHANGE_PASSWORD";

pub struct SecurityService {
    resolver: Arc<IdentityResolver>,
    policy: PasswordPolicy,
    user_fields: FieldMap,
    role_fields: FieldMap,
}

impl SecurityService {
    #[must_use]
    pub fn new(resolver: Arc<IdentityResolver>, policy: PasswordPolicy) -> Self {
        Self {
            resolver,
            policy,
            user_fields: USER_FIELDS,
            role_fields: ROLE_FIELDS,
        }
    }

    /// ## Errors
    /// Returns `InvalidConfiguration` if the password pattern does not compile.
    pub fn from_config(
        config: &SecurityConfig,
        resolver: Arc<IdentityResolver>,
    ) -> ServiceResult<Self> {
        Ok(Self::new(
            resolver,
            PasswordPolicy::new(&config.password_pattern)?,
        ))
    }

    /// Replaces the external field names accepted by filters and orderings.
    #[must_use]
    pub fn with_field_maps(mut self, user_fields: FieldMap, role_fields: FieldMap) -> Self {
        self.user_fields = user_fields;
        self.role_fields = role_fields;
        self
    }

    #[must_use]
    pub const fn resolver(&self) -> &Arc<IdentityResolver> {
        &self.resolver
    }

    fn store(&self) -> &dyn SecurityStore {
        self.resolver.store().as_ref()
    }

    /// Hashes a newly set password after checking its format. Blank means none.
    fn new_password_hash(&self, password: Option<&str>) -> ServiceResult<Option<String>> {
        match password.filter(|p| !p.trim().is_empty()) {
            Some(password) => {
                self.policy.check(password)?;
                Ok(hash_password(Some(password)))
            }
            None => Ok(None),
        }
    }

    /// ## Errors
    /// Returns `DatabaseError(InvalidFilter)` on an unknown field or malformed
    /// clause, or any storage error.
    #[tracing::instrument(skip(self))]
    pub fn list_users(
        &self,
        filter: Option<&str>,
        order_by: Option<&str>,
    ) -> ServiceResult<Vec<User>> {
        let query = self.user_fields.query(filter, order_by)?;
        Ok(self.store().users().select(&query)?)
    }

    /// ## Errors
    /// Returns `NotFound` if no such user is stored.
    #[tracing::instrument(skip(self))]
    pub fn get_user(&self, user_id: &str) -> ServiceResult<User> {
        self.store()
            .users()
            .select_by_id(user_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("user '{user_id}'")))
    }

    /// ## Summary
    /// Stores a new user. A non-blank password must match the password format
    /// and only its hash is kept; without one the account is directory-backed.
    ///
    /// ## Errors
    /// Returns `InvalidRequest` for a blank id or a malformed password, and a
    /// `Conflict` database error if the id is taken.
    #[tracing::instrument(skip(self, new_user), fields(user_id = %new_user.id))]
    pub fn create_user(&self, new_user: NewUser) -> ServiceResult<User> {
        if new_user.id.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("user id is required".to_string()));
        }
        let hash = self.new_password_hash(new_user.password.as_deref())?;
        let user = self.store().users().insert(new_user.into_user(hash))?;
        tracing::info!(user_id = %user.id, "User created");
        Ok(user)
    }

    /// ## Summary
    /// Replaces a stored user. Without a password the stored hash is kept.
    ///
    /// ## Errors
    /// Returns `NotFound` if the user does not exist, `InvalidRequest` for a
    /// malformed password.
    #[tracing::instrument(skip(self, new_user), fields(user_id = %new_user.id))]
    pub fn update_user(&self, new_user: NewUser) -> ServiceResult<User> {
        let existing = self.get_user(&new_user.id)?;
        let hash = match self.new_password_hash(new_user.password.as_deref())? {
            Some(hash) => Some(hash),
            None => existing.password_hash,
        };
        let user = self.store().users().update(new_user.into_user(hash))?;
        self.resolver.evict_user(&user.id);
        tracing::info!(user_id = %user.id, "User updated");
        Ok(user)
    }

    /// ## Errors
    /// Returns `NotFound` if the user does not exist.
    #[tracing::instrument(skip(self))]
    pub fn delete_user(&self, user_id: &str) -> ServiceResult<()> {
        if !self.store().users().delete(user_id)? {
            return Err(ServiceError::NotFound(format!("user '{user_id}'")));
        }
        self.resolver.evict_user(user_id);
        tracing::info!(user_id = %user_id, "User deleted");
        Ok(())
    }

    /// ## Summary
    /// Changes the password of a local account.
    ///
    /// Refused for the anonymous and super-user ids, for a blank new password,
    /// for unknown or directory-backed accounts and when the old password does
    /// not match. The new password must then match the password format.
    ///
    /// ## Errors
    /// Returns `InvalidRequest("CAN_NOT_CHANGE_PASSWORD")` or
    /// `InvalidRequest("INVALID_PASSWORD_FORMAT")`.
    #[tracing::instrument(skip(self, old_password, new_password))]
    pub fn change_password(
        &self,
        user_id: &str,
        old_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        let refused = || ServiceError::InvalidRequest(CAN_NOT_CHANGE_PASSWORD.to_string());

        if user_id == ADMIN_USER || user_id == ANONYMOUS_USER || new_password.trim().is_empty() {
            return Err(refused());
        }
        let mut user = self
            .store()
            .users()
            .select_by_id(user_id)?
            .ok_or_else(refused)?;
        let old_matches = user
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(old_password, hash));
        if !old_matches {
            tracing::debug!(user_id = %user_id, "Old password does not match");
            return Err(refused());
        }

        self.policy.check(new_password)?;
        user.password_hash = hash_password(Some(new_password));
        self.store().users().update(user)?;
        self.resolver.evict_user(user_id);
        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// ## Errors
    /// Returns `DatabaseError(InvalidFilter)` on an unknown field or malformed
    /// clause, or any storage error.
    #[tracing::instrument(skip(self))]
    pub fn list_roles(
        &self,
        filter: Option<&str>,
        order_by: Option<&str>,
    ) -> ServiceResult<Vec<Role>> {
        let query = self.role_fields.query(filter, order_by)?;
        Ok(self.store().roles().select(&query)?)
    }

    /// ## Errors
    /// Returns `NotFound` if no such role is stored.
    #[tracing::instrument(skip(self))]
    pub fn get_role(&self, role_id: &str) -> ServiceResult<Role> {
        self.store()
            .roles()
            .select_by_id(role_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("role '{role_id}'")))
    }

    /// ## Errors
    /// Returns `InvalidRequest` for a blank id and a `Conflict` database error
    /// if the id is taken.
    #[tracing::instrument(skip(self, role), fields(role_id = %role.id))]
    pub fn create_role(&self, role: Role) -> ServiceResult<Role> {
        if role.id.trim().is_empty() {
            return Err(ServiceError::InvalidRequest("role id is required".to_string()));
        }
        let role = self.store().roles().insert(role)?;
        // A synthesized empty role may be cached under this id.
        self.resolver.evict_role(&role.id);
        tracing::info!(role_id = %role.id, "Role created");
        Ok(role)
    }

    /// ## Errors
    /// Returns a `NotFound` database error if the role does not exist.
    #[tracing::instrument(skip(self, role), fields(role_id = %role.id))]
    pub fn update_role(&self, role: Role) -> ServiceResult<Role> {
        let role = self.store().roles().update(role)?;
        self.resolver.evict_role(&role.id);
        tracing::info!(role_id = %role.id, "Role updated");
        Ok(role)
    }

    /// ## Errors
    /// Returns `NotFound` if the role does not exist.
    #[tracing::instrument(skip(self))]
    pub fn delete_role(&self, role_id: &str) -> ServiceResult<()> {
        if !self.store().roles().delete(role_id)? {
            return Err(ServiceError::NotFound(format!("role '{role_id}'")));
        }
        self.resolver.evict_role(role_id);
        tracing::info!(role_id = %role_id, "Role deleted");
        Ok(())
    }
}
