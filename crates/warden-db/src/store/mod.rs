pub mod empty;
pub mod memory;
pub mod registry;

pub use empty::EmptyStore;
pub use memory::{MemoryStore, StoreSeed};
pub use registry::{StoreFactory, StoreRegistry};

use crate::error::DbResult;
use crate::filter::Query;
use crate::model::{Record, Role, User};

/// CRUD access to one kind of record. Every call is its own transaction.
pub trait Repository<T: Record>: Send + Sync {
    /// ## Errors
    /// Returns an error if the backend cannot be reached.
    fn select_by_id(&self, id: &str) -> DbResult<Option<T>>;

    /// ## Errors
    /// Returns an error if the backend cannot be reached.
    fn select(&self, query: &Query) -> DbResult<Vec<T>>;

    /// ## Errors
    /// Returns `Conflict` if a record with the same id already exists.
    fn insert(&self, record: T) -> DbResult<T>;

    /// ## Errors
    /// Returns `NotFound` if no record with that id exists.
    fn update(&self, record: T) -> DbResult<T>;

    /// Returns whether a record was removed.
    ///
    /// ## Errors
    /// Returns an error if the backend cannot be reached.
    fn delete(&self, id: &str) -> DbResult<bool>;
}

/// The user and role repositories of one storage backend.
pub trait SecurityStore: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &'static str;

    fn users(&self) -> &dyn Repository<User>;

    fn roles(&self) -> &dyn Repository<Role>;
}
