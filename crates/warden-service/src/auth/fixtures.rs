//! Test doubles shared by the unit tests of this module.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use warden_db::error::{DbError, DbResult};
use warden_db::filter::Query;
use warden_db::model::{Record, Role, User};
use warden_db::store::{MemoryStore, Repository, SecurityStore, StoreSeed};

use super::directory::{Directory, StaticDirectory};
use super::password::hash_password;
use crate::error::ServiceResult;

pub const ADMIN_PASSWORD: &str = "admin-secret";

/// Static directory that counts how often it is asked.
pub struct CountingDirectory {
    inner: StaticDirectory,
    calls: AtomicUsize,
}

impl CountingDirectory {
    pub fn new(accounts: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            inner: StaticDirectory::new(accounts.iter().copied()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Directory for CountingDirectory {
    fn name(&self) -> &str {
        "counting"
    }

    fn validate_credentials(&self, user_id: &str, password: &str) -> ServiceResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.validate_credentials(user_id, password)
    }
}

/// Directory whose backend is always down.
pub struct UnreachableDirectory;

impl Directory for UnreachableDirectory {
    fn name(&self) -> &str {
        "unreachable"
    }

    fn validate_credentials(&self, _user_id: &str, _password: &str) -> ServiceResult<bool> {
        Err(crate::error::ServiceError::InvalidConfiguration(
            "directory unreachable".to_string(),
        ))
    }
}

struct FailingRepository;

impl<T: Record> Repository<T> for FailingRepository {
    fn select_by_id(&self, _id: &str) -> DbResult<Option<T>> {
        Err(DbError::Unavailable("down".to_string()))
    }

    fn select(&self, _query: &Query) -> DbResult<Vec<T>> {
        Err(DbError::Unavailable("down".to_string()))
    }

    fn insert(&self, _record: T) -> DbResult<T> {
        Err(DbError::Unavailable("down".to_string()))
    }

    fn update(&self, _record: T) -> DbResult<T> {
        Err(DbError::Unavailable("down".to_string()))
    }

    fn delete(&self, _id: &str) -> DbResult<bool> {
        Err(DbError::Unavailable("down".to_string()))
    }
}

/// Store whose every call fails.
pub struct FailingStore {
    repository: FailingRepository,
}

impl FailingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            repository: FailingRepository,
        })
    }
}

impl SecurityStore for FailingStore {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn users(&self) -> &dyn Repository<User> {
        &self.repository
    }

    fn roles(&self) -> &dyn Repository<Role> {
        &self.repository
    }
}

pub fn local_user(id: &str, password: &str, roles: &[&str]) -> User {
    let mut user = User::synthetic(id);
    user.password_hash = hash_password(Some(password));
    user.role_ids = roles.iter().map(ToString::to_string).collect();
    user
}

/// `jdoe` (local, password `jdoe-pass`, role `editors`) and `ldapuser`
/// (directory-backed). Roles: `editors -> writers -> readers -> editors`.
pub fn seeded_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::from_seed(StoreSeed {
        users: vec![
            local_user("jdoe", "jdoe-pass", &["editors"]),
            User::synthetic("ldapuser"),
        ],
        roles: vec![
            Role::including("editors", ["writers"]),
            Role::including("writers", ["readers"]),
            Role::including("readers", ["editors"]),
        ],
    }))
}
