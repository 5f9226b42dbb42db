//! Warden identity service - integration test support.
//!
//! Re-exports the workspace crates so integration tests use `warden_test::`
//! paths only.

pub mod component {
    pub use warden_core::{config, constants};
    pub use warden_service::{auth, error};

    pub mod db {
        pub use warden_db::error::{DbError, DbResult};
        pub use warden_db::filter;
        pub use warden_db::model;
        pub use warden_db::store;
    }
}

pub mod app {
    pub use warden_app::app::api;
    pub use warden_app::error::{AppError, ErrorResponse};
    pub use warden_app::security_handler::SecurityServiceHandler;
}
