use std::marker::PhantomData;

use super::{Repository, SecurityStore};
use crate::error::{DbError, DbResult};
use crate::filter::Query;
use crate::model::{Record, Role, User};

/// Repository that holds nothing and accepts no writes.
pub struct EmptyRepository<T>(PhantomData<fn() -> T>);

impl<T> Default for EmptyRepository<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T: Record> Repository<T> for EmptyRepository<T> {
    fn select_by_id(&self, _id: &str) -> DbResult<Option<T>> {
        Ok(None)
    }

    fn select(&self, _query: &Query) -> DbResult<Vec<T>> {
        Ok(Vec::new())
    }

    fn insert(&self, _record: T) -> DbResult<T> {
        Err(DbError::ReadOnly)
    }

    fn update(&self, _record: T) -> DbResult<T> {
        Err(DbError::ReadOnly)
    }

    fn delete(&self, _id: &str) -> DbResult<bool> {
        Err(DbError::ReadOnly)
    }
}

/// Fallback backend when no usable store is configured. Only the super-user
/// and directory-backed accounts can authenticate against it.
#[derive(Default)]
pub struct EmptyStore {
    users: EmptyRepository<User>,
    roles: EmptyRepository<Role>,
}

impl SecurityStore for EmptyStore {
    fn name(&self) -> &'static str {
        "empty"
    }

    fn users(&self) -> &dyn Repository<User> {
        &self.users
    }

    fn roles(&self) -> &dyn Repository<Role> {
        &self.roles
    }
}
