//! Shared configuration, reserved identities and core errors for the warden
//! identity service.

pub mod config;
pub mod constants;
pub mod error;
