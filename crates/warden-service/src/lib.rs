//! Identity resolution and authorization caching.
//!
//! Turns the `Authorization` header of a request into a resolved identity: the
//! caller's user record plus the closure of every role it holds.

pub mod auth;
pub mod error;
