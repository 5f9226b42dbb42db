use salvo::http::StatusCode;
use salvo::http::header::{HeaderValue, WWW_AUTHENTICATE};
use salvo::writing::Json;
use serde::Serialize;
use thiserror::Error;
use warden_db::error::DbError;
use warden_service::error::ServiceError;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] ServiceError),

    #[error(transparent)]
    DatabaseError(#[from] DbError),

    #[error(transparent)]
    CoreError(#[from] warden_core::error::CoreError),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Background task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

/// ## Summary
/// Error response payload
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        let db_status = |e: &DbError| match e {
            DbError::NotFound(_) => StatusCode::NOT_FOUND,
            DbError::Conflict(_) => StatusCode::CONFLICT,
            DbError::InvalidFilter(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match self {
            Self::ServiceError(ServiceError::NotAuthorized) => StatusCode::UNAUTHORIZED,
            Self::ServiceError(ServiceError::InvalidRequest(_)) | Self::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::ServiceError(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::ServiceError(ServiceError::DatabaseError(e)) | Self::DatabaseError(e) => {
                db_status(e)
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::ServiceError(_) | Self::CoreError(_) | Self::TaskFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// ## Summary
    /// Writes the error as a JSON `{"error": ...}` response.
    ///
    /// Server errors are logged and replaced by a generic message. A 401 asks
    /// for basic credentials.
    pub fn render(&self, res: &mut salvo::Response) {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
            "Internal server error".to_string()
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
            self.to_string()
        };

        if status == StatusCode::UNAUTHORIZED {
            res.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"warden\""),
            );
        }
        res.status_code(status);
        res.render(Json(ErrorResponse { error: message }));
    }
}

#[salvo::async_trait]
impl salvo::Writer for AppError {
    async fn write(
        self,
        _req: &mut salvo::Request,
        _depot: &mut salvo::Depot,
        res: &mut salvo::Response,
    ) {
        self.render(res);
    }
}
