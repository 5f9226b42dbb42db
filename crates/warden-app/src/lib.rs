//! HTTP surface of the warden identity service.

pub mod app;
pub mod error;
pub mod middleware;
pub mod security_handler;
