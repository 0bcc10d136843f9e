//! Operator account repository.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use driftwell_core::{AdminUserId, Email};

use super::RepositoryError;
use crate::models::admin_user::{AdminRole, AdminUser};

const ADMIN_USER_COLUMNS: &str = "id, email, name, password_hash, role, created_at";

/// Repository for operator accounts.
pub struct AdminUserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an operator account by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored field cannot
    /// be decoded.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<AdminUser>, RepositoryError> {
        let query = format!("SELECT {ADMIN_USER_COLUMNS} FROM admin_users WHERE email = $1");

        let row = sqlx::query(&query)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(|r| row_to_admin_user(&r)).transpose()
    }

    /// Create an operator account with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        name: &str,
        password_hash: &str,
        role: AdminRole,
    ) -> Result<AdminUser, RepositoryError> {
        let query = format!(
            "INSERT INTO admin_users (email, name, password_hash, role) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ADMIN_USER_COLUMNS}"
        );

        let row = sqlx::query(&query)
            .bind(email.as_str())
            .bind(name)
            .bind(password_hash)
            .bind(role.as_str())
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict("email already exists".to_string());
                }
                RepositoryError::Database(e)
            })?;

        row_to_admin_user(&row)
    }
}

fn row_to_admin_user(row: &PgRow) -> Result<AdminUser, RepositoryError> {
    let email: String = row.try_get("email")?;
    let email = Email::parse(&email).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
    })?;

    let role: String = row.try_get("role")?;
    let role = AdminRole::parse(&role)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid role in database: {e}")))?;

    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(AdminUser {
        id: AdminUserId::new(row.try_get("id")?),
        email,
        name: row.try_get("name")?,
        password_hash: row.try_get("password_hash")?,
        role,
        created_at,
    })
}
