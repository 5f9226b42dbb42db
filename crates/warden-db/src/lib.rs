//! Storage boundary of the warden identity service.
//!
//! The security core only sees the [`store::SecurityStore`] trait; concrete
//! backends are picked at startup through the [`store::registry::StoreRegistry`].

pub mod error;
pub mod filter;
pub mod model;
pub mod store;
