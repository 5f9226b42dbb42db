//! Per-account credential validation.
//!
//! The strategy is picked by account type, in a fixed order:
//!
//! 1. the anonymous id is accepted as anonymous whatever the password;
//! 2. the super-user is checked against the configured secret;
//! 3. accounts without a stored hash are checked by the external directory;
//! 4. every other account is checked against its stored hash.
//!
//! Every rejection is the same [`ServiceError::NotAuthorized`], whichever
//! branch produced it.

use std::sync::Arc;

use warden_core::constants::{ADMIN_USER, ANONYMOUS_USER};
use warden_db::model::User;
use warden_db::store::SecurityStore;

use super::directory::Directory;
use super::password::{constant_time_eq, verify_password};
use crate::error::{ServiceError, ServiceResult};

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validated {
    Anonymous,
    /// The stored (or synthesized) record, roles not yet expanded.
    User(User),
}

pub struct CredentialValidator {
    admin_password: String,
    store: Arc<dyn SecurityStore>,
    directory: Option<Arc<dyn Directory>>,
}

impl CredentialValidator {
    #[must_use]
    pub fn new(
        admin_password: impl Into<String>,
        store: Arc<dyn SecurityStore>,
        directory: Option<Arc<dyn Directory>>,
    ) -> Self {
        Self {
            admin_password: admin_password.into(),
            store,
            directory,
        }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn SecurityStore> {
        &self.store
    }

    /// ## Summary
    /// Loads the stored record for `user_id`, or synthesizes one when storage
    /// does not know the id.
    ///
    /// ## Errors
    /// Returns `NotAuthorized` if the store cannot be queried.
    pub fn load_user(&self, user_id: &str) -> ServiceResult<User> {
        match self.store.users().select_by_id(user_id) {
            Ok(Some(user)) => Ok(user),
            Ok(None) => {
                tracing::debug!(user_id = %user_id, "User unknown to storage, synthesizing");
                Ok(User::synthetic(user_id))
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    store = self.store.name(),
                    error = %e,
                    "User lookup failed, rejecting credentials"
                );
                Err(ServiceError::NotAuthorized)
            }
        }
    }

    /// ## Summary
    /// Validates basic credentials.
    ///
    /// ## Errors
    /// Returns `NotAuthorized` on any mismatch, and when the store or the
    /// directory cannot be reached.
    #[tracing::instrument(skip(self, password))]
    pub fn validate(&self, user_id: &str, password: &str) -> ServiceResult<Validated> {
        if user_id == ANONYMOUS_USER {
            return Ok(Validated::Anonymous);
        }

        let user = self.load_user(user_id)?;

        let accepted = if user.id == ADMIN_USER {
            self.check_admin(password)
        } else if let Some(hash) = &user.password_hash {
            verify_password(password, hash)
        } else {
            self.check_directory(&user.id, password)
        };

        if accepted {
            tracing::debug!(user_id = %user.id, "Credentials accepted");
            Ok(Validated::User(user))
        } else {
            tracing::debug!(user_id = %user_id, "Credentials rejected");
            Err(ServiceError::NotAuthorized)
        }
    }

    fn check_admin(&self, password: &str) -> bool {
        // A blank configured secret disables the super-user.
        !self.admin_password.is_empty()
            && constant_time_eq(password.as_bytes(), self.admin_password.as_bytes())
    }

    fn check_directory(&self, user_id: &str, password: &str) -> bool {
        let Some(directory) = &self.directory else {
            tracing::debug!(user_id = %user_id, "No directory configured for account without password");
            return false;
        };
        match directory.validate_credentials(user_id, password) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    directory = directory.name(),
                    error = %e,
                    "Directory validation failed, rejecting credentials"
                );
                false
            }
        }
    }
}
