//! Unified error handling with Sentry integration.
//!
//! Console handlers return `Result<T, AdminError>`. Server-side failures
//! are captured to Sentry before a response leaves the process; operator
//! mistakes (bad credentials, rejected transitions) are not.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;

/// Application-level error type for the admin console.
#[derive(Debug, Error)]
pub enum AdminError {
    /// A status change affected zero rows: the order does not exist or has
    /// already moved past the expected status.
    #[error("Status change rejected: {0}")]
    TransitionRejected(String),

    /// Form input the console cannot act on.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdminError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::TransitionRejected(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Database(_) | Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (self.status(), self.public_message()).into_response()
    }
}

/// Result type alias for `AdminError`.
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AdminError::TransitionRejected("already shipped".to_string()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AdminError::NotFound("order".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AdminError::Database(RepositoryError::NotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err = AdminError::Internal("pool exhausted at 10.0.0.3".to_string());
        assert_eq!(err.public_message(), "Internal server error");
    }
}
