//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers should return
//! `Result<T, AppError>`. API routes (`/api/*`) receive JSON error bodies of
//! the form `{"error": "..."}`; page routes receive plain text the error
//! page wraps.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use driftwell_core::Won;
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::portone::PortOneError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required checkout field is missing or invalid. Never reaches the
    /// network layer of the payment flow.
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// Checkout attempted with zero items.
    #[error("Cart is empty")]
    EmptyCart,

    /// Payment processor credentials or environment misconfigured.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The shopper closed or declined the payment window. Not an error
    /// condition for the user; the pending order has been cleaned up.
    #[error("Payment cancelled: {0}")]
    UserCancelled(String),

    /// The processor's authoritative status for this payment is not PAID.
    #[error("Payment not confirmed (status: {0})")]
    PaymentNotConfirmed(String),

    /// The processor's authoritative amount disagrees with the amount the
    /// server expected. Tamper or bug signal; logged loudly.
    #[error("Amount mismatch: expected {expected}, processor reported {actual}")]
    AmountMismatch { expected: Won, actual: Won },

    /// Database write failed after successful payment verification. The
    /// money moved but no order row exists; remediation is manual
    /// reconciliation, so the message must not suggest retrying payment.
    #[error("Order recording failed after verified payment: {0}")]
    OrderRecording(#[source] RepositoryError),

    /// Payment processor API operation failed.
    #[error("Processor error: {0}")]
    Processor(#[from] PortOneError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// An update affected zero rows: the target does not exist or the
    /// caller may not modify it.
    #[error("Not permitted: {0}")]
    Authorization(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::EmptyCart | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::UserCancelled(_) | Self::PaymentNotConfirmed(_) | Self::AmountMismatch { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Processor(_) => StatusCode::BAD_GATEWAY,
            Self::Authorization(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) | Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Configuration(_)
            | Self::OrderRecording(_)
            | Self::Database(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Capture server-side failures to Sentry. `AmountMismatch` is included
    /// even though it maps to a 4xx: it should never happen in correct
    /// operation and someone needs to look at it.
    fn capture(&self) {
        if matches!(
            self,
            Self::Configuration(_)
                | Self::OrderRecording(_)
                | Self::Database(_)
                | Self::Processor(_)
                | Self::Internal(_)
                | Self::AmountMismatch { .. }
        ) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }
    }

    /// Message shown to the client. Internal details stay in logs.
    fn public_message(&self) -> String {
        match self {
            Self::OrderRecording(_) => {
                "Your payment succeeded but the order could not be recorded. \
                 Please contact support - do not pay again."
                    .to_string()
            }
            Self::Configuration(_) | Self::Database(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Processor(_) => "Payment service error, please try again later".to_string(),
            Self::AmountMismatch { .. } => {
                "Payment could not be verified. No order was created.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.capture();

        let status = self.status();
        let message = self.public_message();

        (status, message).into_response()
    }
}

/// JSON-bodied rendering of [`AppError`] for the `/api/*` routes.
///
/// Same status mapping and Sentry capture; the body is
/// `{"error": "..."}` so the checkout page scripts can read it.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.capture();

        let status = self.0.status();
        let message = self.0.public_message();

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order ORD-251114-K3QX".to_string());
        assert_eq!(err.to_string(), "Not found: order ORD-251114-K3QX");

        let err = AppError::AmountMismatch {
            expected: Won::new(22800),
            actual: Won::new(100),
        };
        assert_eq!(
            err.to_string(),
            "Amount mismatch: expected ₩22,800, processor reported ₩100"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(AppError::EmptyCart.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::PaymentNotConfirmed("FAILED".to_string()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::AmountMismatch {
                expected: Won::new(1),
                actual: Won::new(2),
            }
            .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Authorization("status change rejected".to_string()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::OrderRecording(RepositoryError::NotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_order_recording_message_is_distinct() {
        // The worst-case failure must not read like a generic error: the
        // shopper has paid and must not retry payment.
        let err = AppError::OrderRecording(RepositoryError::NotFound);
        assert!(err.public_message().contains("do not pay again"));
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err = AppError::Internal("pool exhausted at 10.0.0.3".to_string());
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_page_errors_are_plain_text() {
        let response = AppError::NotFound("order".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        assert!(content_type.starts_with("text/plain"), "{content_type}");
    }

    #[test]
    fn test_api_errors_are_json() {
        let response = ApiError(AppError::EmptyCart).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let content_type = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        assert!(content_type.starts_with("application/json"), "{content_type}");
    }
}
