use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Deserialize;

use super::{Repository, SecurityStore};
use crate::error::{DbError, DbResult};
use crate::filter::Query;
use crate::model::{Record, Role, User};

/// Records loaded into a [`MemoryStore`] at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSeed {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Repository keeping records in an ordered map behind a lock.
pub struct MemoryRepository<T> {
    records: RwLock<BTreeMap<String, T>>,
}

impl<T: Record> MemoryRepository<T> {
    fn new(records: impl IntoIterator<Item = T>) -> Self {
        Self {
            records: RwLock::new(
                records
                    .into_iter()
                    .map(|record| (record.id().to_string(), record))
                    .collect(),
            ),
        }
    }

    fn read(&self) -> DbResult<RwLockReadGuard<'_, BTreeMap<String, T>>> {
        self.records
            .read()
            .map_err(|_poisoned| DbError::Unavailable(format!("{} store lock poisoned", T::KIND)))
    }

    fn write(&self) -> DbResult<RwLockWriteGuard<'_, BTreeMap<String, T>>> {
        self.records
            .write()
            .map_err(|_poisoned| DbError::Unavailable(format!("{} store lock poisoned", T::KIND)))
    }
}

impl<T: Record> Repository<T> for MemoryRepository<T> {
    fn select_by_id(&self, id: &str) -> DbResult<Option<T>> {
        Ok(self.read()?.get(id).cloned())
    }

    fn select(&self, query: &Query) -> DbResult<Vec<T>> {
        let mut selected: Vec<T> = self
            .read()?
            .values()
            .filter(|record| query.matches(*record))
            .cloned()
            .collect();
        selected.sort_by(|a, b| query.compare(a, b));
        Ok(selected)
    }

    fn insert(&self, record: T) -> DbResult<T> {
        let mut records = self.write()?;
        if records.contains_key(record.id()) {
            return Err(DbError::Conflict(format!(
                "{} '{}' already exists",
                T::KIND,
                record.id()
            )));
        }
        records.insert(record.id().to_string(), record.clone());
        Ok(record)
    }

    fn update(&self, record: T) -> DbResult<T> {
        let mut records = self.write()?;
        let Some(existing) = records.get_mut(record.id()) else {
            return Err(DbError::NotFound(format!("{} '{}'", T::KIND, record.id())));
        };
        *existing = record.clone();
        Ok(record)
    }

    fn delete(&self, id: &str) -> DbResult<bool> {
        Ok(self.write()?.remove(id).is_some())
    }
}

/// Process-local store; contents are lost on restart.
pub struct MemoryStore {
    users: MemoryRepository<User>,
    roles: MemoryRepository<Role>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::from_seed(StoreSeed::default())
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_seed(seed: StoreSeed) -> Self {
        Self {
            users: MemoryRepository::new(seed.users),
            roles: MemoryRepository::new(seed.roles),
        }
    }

    /// ## Summary
    /// Loads a JSON seed of the form `{ "users": [...], "roles": [...] }`.
    ///
    /// ## Errors
    /// Returns an error if the file cannot be read or parsed.
    #[tracing::instrument]
    pub fn from_seed_file(path: &Path) -> DbResult<Self> {
        let seed: StoreSeed = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        tracing::info!(
            users = seed.users.len(),
            roles = seed.roles.len(),
            "Memory store seeded"
        );
        Ok(Self::from_seed(seed))
    }
}

impl SecurityStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn users(&self) -> &dyn Repository<User> {
        &self.users
    }

    fn roles(&self) -> &dyn Repository<Role> {
        &self.roles
    }
}
