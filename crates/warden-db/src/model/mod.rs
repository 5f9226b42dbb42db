pub mod role;
pub mod user;

pub use role::Role;
pub use user::{NewUser, User};

/// A record persisted by a [`crate::store::Repository`].
pub trait Record: Clone + Send + Sync + 'static {
    /// Human readable record kind, used in error messages and logs.
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Returns the value of an internal attribute for filtering and ordering.
    fn attribute(&self, name: &str) -> Option<&str>;
}
