//! Seed command: grant the welcome coupon to a shopper.
//!
//! Issuance is at-most-once per (shopper, coupon name); running the command
//! twice for the same email reports the existing grant instead of failing.

use chrono::Utc;
use secrecy::SecretString;
use thiserror::Error;

use driftwell_core::Email;
use driftwell_storefront::db::{self, CouponRepository, RepositoryError};

/// Errors that can occur during seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// The provided email is invalid.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

/// Grant the welcome coupon to `email`.
///
/// # Errors
///
/// Returns `SeedError` if the email is invalid, `DATABASE_URL` is not set,
/// or the insert fails for a reason other than an existing grant.
pub async fn welcome_coupon(email: &str) -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let owner = Email::parse(email).map_err(|e| SeedError::InvalidEmail(e.to_string()))?;

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| SeedError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    match CouponRepository::new(&pool)
        .grant_welcome(&owner, Utc::now())
        .await
    {
        Ok(Some(coupon)) => {
            tracing::info!(
                owner = %owner,
                discount = %coupon.discount_amount,
                expires_at = %coupon.expires_at,
                "Welcome coupon granted"
            );
            Ok(())
        }
        Ok(None) => {
            tracing::info!(owner = %owner, "Shopper already holds the welcome coupon; nothing to do");
            Ok(())
        }
        Err(e) => Err(SeedError::Repository(e)),
    }
}
