//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during OAuth login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Provider is not configured (missing client id or secret).
    #[error("{0} login is not configured")]
    ProviderNotConfigured(&'static str),

    /// Unknown provider name in the URL.
    #[error("unknown provider: {0}")]
    UnknownProvider(String),

    /// OAuth `state` did not match the session; possible CSRF.
    #[error("oauth state mismatch")]
    StateMismatch,

    /// HTTP request to the provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error response.
    #[error("provider error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Provider response could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// Provider did not share an email address.
    ///
    /// Orders are keyed by buyer email, so an account without one cannot
    /// shop here.
    #[error("provider shared no email address")]
    MissingEmail,

    /// Provider-reported email failed validation.
    #[error("invalid email from provider: {0}")]
    InvalidEmail(#[from] driftwell_core::EmailError),
}
