//! Transitive expansion of role inclusion.

use std::collections::BTreeSet;
use std::sync::Arc;

use warden_db::model::Role;
use warden_db::store::Repository;

use super::cache::TtlCache;
use crate::error::ServiceResult;

/// Computes the closure of a role set over the inclusion relation.
///
/// Roles are looked up in the role cache first, then in storage. An id
/// unknown to storage is an empty role; it is cached like a stored one so
/// repeated references do not hit storage again.
pub struct RoleExpander<'a> {
    roles: &'a dyn Repository<Role>,
    cache: &'a TtlCache<String, Arc<Role>>,
}

impl<'a> RoleExpander<'a> {
    #[must_use]
    pub fn new(roles: &'a dyn Repository<Role>, cache: &'a TtlCache<String, Arc<Role>>) -> Self {
        Self { roles, cache }
    }

    /// ## Errors
    /// Returns an error if storage cannot be queried.
    pub fn lookup(&self, role_id: &str) -> ServiceResult<Arc<Role>> {
        if let Some(role) = self.cache.get(role_id) {
            return Ok(role);
        }

        let role = Arc::new(match self.roles.select_by_id(role_id)? {
            Some(role) => role,
            None => {
                tracing::trace!(role_id = %role_id, "Role unknown to storage, using empty role");
                Role::empty(role_id)
            }
        });
        self.cache.put(role_id.to_string(), Arc::clone(&role));
        Ok(role)
    }

    /// ## Summary
    /// Returns `initial` plus every role reachable from it.
    ///
    /// Each id enters the worklist at most once, so cycles and self-inclusion
    /// terminate.
    ///
    /// ## Errors
    /// Returns an error if storage cannot be queried.
    pub fn expand<I>(&self, initial: I) -> ServiceResult<BTreeSet<String>>
    where
        I: IntoIterator<Item = String>,
    {
        let mut closure: BTreeSet<String> = initial.into_iter().collect();
        let mut worklist: Vec<String> = closure.iter().cloned().collect();

        while let Some(role_id) = worklist.pop() {
            let role = self.lookup(&role_id)?;
            for included in &role.role_ids {
                if closure.insert(included.clone()) {
                    worklist.push(included.clone());
                }
            }
        }

        Ok(closure)
    }
}
