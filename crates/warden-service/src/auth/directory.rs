//! External directory capability.
//!
//! Accounts without a local password hash are validated by a directory. The
//! directory protocol itself lives behind the [`Directory`] trait; the only
//! built-in implementation is [`StaticDirectory`], fed from configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use warden_core::config::DirectoryConfig;

use super::password::{hash_password, verify_password};
use crate::error::ServiceResult;

/// Validates credentials of accounts managed outside the local store.
///
/// Calls are synchronous and may block on I/O; no timeout is imposed here.
pub trait Directory: Send + Sync {
    /// Directory name, for logs.
    fn name(&self) -> &str;

    /// ## Errors
    /// Returns an error if the directory cannot be reached. The caller treats
    /// that as a rejection.
    fn validate_credentials(&self, user_id: &str, password: &str) -> ServiceResult<bool>;
}

/// Directory holding a fixed set of accounts, passwords kept as digests.
pub struct StaticDirectory {
    accounts: BTreeMap<String, String>,
}

impl StaticDirectory {
    #[must_use]
    pub fn new<I, U, P>(accounts: I) -> Self
    where
        I: IntoIterator<Item = (U, P)>,
        U: Into<String>,
        P: AsRef<str>,
    {
        Self {
            accounts: accounts
                .into_iter()
                .filter_map(|(user_id, password)| {
                    hash_password(Some(password.as_ref())).map(|hash| (user_id.into(), hash))
                })
                .collect(),
        }
    }

    /// ## Summary
    /// Builds the directory described by the configuration, if it is enabled.
    #[must_use]
    pub fn from_config(config: &DirectoryConfig) -> Option<Arc<dyn Directory>> {
        if !config.enabled {
            return None;
        }
        let directory = Self::new(&config.accounts);
        tracing::info!(
            accounts = directory.accounts.len(),
            "Static directory enabled"
        );
        Some(Arc::new(directory))
    }
}

impl Directory for StaticDirectory {
    fn name(&self) -> &str {
        "static"
    }

    fn validate_credentials(&self, user_id: &str, password: &str) -> ServiceResult<bool> {
        Ok(self
            .accounts
            .get(user_id)
            .is_some_and(|hash| verify_password(password, hash)))
    }
}
