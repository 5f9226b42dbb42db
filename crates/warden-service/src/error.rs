use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Credentials were rejected. Deliberately carries no detail about why.
    #[error("Not authorized")]
    NotAuthorized,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(transparent)]
    DatabaseError(#[from] warden_db::error::DbError),

    #[error(transparent)]
    CoreError(#[from] warden_core::error::CoreError),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
