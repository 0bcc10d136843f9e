//! Operator account management commands.
//!
//! # Usage
//!
//! ```bash
//! driftwell-cli admin create -e ops@driftwell.shop -n "Ops" -r operator
//! ```
//!
//! The console has no signup page; this command is the only way accounts
//! are created.

use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
use argon2::Argon2;
use rand::Rng;
use rand::distr::Alphanumeric;
use secrecy::SecretString;
use thiserror::Error;

use driftwell_admin::db::{self, AdminUserRepository, RepositoryError};
use driftwell_admin::models::AdminRole;
use driftwell_core::Email;

/// Length of a generated password when none is supplied.
const GENERATED_PASSWORD_LENGTH: usize = 24;

/// Errors that can occur during operator management.
#[derive(Debug, Error)]
pub enum AdminCmdError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: operator, super_admin")]
    InvalidRole(String),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Operator already exists.
    #[error("Operator already exists with email: {0}")]
    UserExists(String),

    /// Password hashing failed.
    #[error("Password hashing error: {0}")]
    Hashing(String),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Repository operation failed.
    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

/// Create a new operator account.
///
/// When `password` is `None` a random password is generated and logged.
///
/// # Errors
///
/// Returns `AdminCmdError` if validation, hashing, or the insert fails.
pub async fn create_user(
    email: &str,
    name: &str,
    role: &str,
    password: Option<&str>,
) -> Result<(), AdminCmdError> {
    dotenvy::dotenv().ok();

    let role = AdminRole::parse(role).map_err(|_| AdminCmdError::InvalidRole(role.to_owned()))?;
    let email = Email::parse(email).map_err(|e| AdminCmdError::InvalidEmail(e.to_string()))?;

    let (password, generated) = match password {
        Some(p) => (p.to_owned(), false),
        None => (random_password(), true),
    };

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AdminCmdError::Hashing(e.to_string()))?
        .to_string();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| AdminCmdError::MissingEnvVar("DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    let user = AdminUserRepository::new(&pool)
        .create(&email, name, &password_hash, role)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => AdminCmdError::UserExists(email.to_string()),
            other => AdminCmdError::Repository(other),
        })?;

    tracing::info!(
        id = %user.id,
        email = %user.email,
        role = user.role.as_str(),
        "Operator account created"
    );
    if generated {
        tracing::info!("Generated password: {password}");
        tracing::info!("Share it over a secure channel; it is not stored anywhere else.");
    }

    Ok(())
}

fn random_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}
