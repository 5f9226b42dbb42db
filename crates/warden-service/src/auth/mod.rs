//! Identity resolution flow.
//!
//! ## Module Organization
//!
//! - `bearer`: Extension point mapping bearer tokens to user ids
//! - `cache`: Concurrent key/value cache with per-entry expiry
//! - `context`: Per-request resolution scope
//! - `credentials`: `Authorization` header parsing (basic, bearer)
//! - `directory`: External directory capability and the static directory
//! - `identity`: The resolved identity handed to request handlers
//! - `password`: Password digests and the password format policy
//! - `resolver`: Cache-then-compute identity resolution (`IdentityResolver`)
//! - `roles`: Transitive expansion of role inclusion
//! - `service`: User and role administration (`SecurityService`)
//! - `validate`: Per-account credential validation strategies

pub mod bearer;
pub mod cache;
pub mod context;
pub mod credentials;
pub mod directory;
#[cfg(test)]
mod fixtures;
pub mod identity;
pub mod password;
pub mod resolver;
pub mod roles;
pub mod service;
pub mod validate;

// Re-export commonly used types at module level
pub use bearer::BearerTokenResolver;
pub use cache::{IdentityCaches, TtlCache};
pub use context::RequestContext;
pub use credentials::Credentials;
pub use directory::{Directory, StaticDirectory};
pub use identity::Identity;
pub use password::{PasswordPolicy, hash_password, verify_password};
pub use resolver::IdentityResolver;
pub use roles::RoleExpander;
pub use service::SecurityService;
pub use validate::{CredentialValidator, Validated};
