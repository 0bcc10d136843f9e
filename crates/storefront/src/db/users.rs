//! User repository for database operations.
//!
//! The storefront has no local password accounts; identity comes from the
//! OAuth providers. The `users` table only carries the saved shipping
//! profile so a returning shopper's checkout form comes prefilled.

use sqlx::{PgPool, Row};

use driftwell_core::Email;

use super::RepositoryError;
use crate::models::user::SavedAddress;

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a shopper's saved shipping profile, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_address(
        &self,
        email: &Email,
    ) -> Result<Option<SavedAddress>, RepositoryError> {
        let row = sqlx::query(
            "SELECT recipient_name, tel, addr, postcode FROM users WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        Ok(Some(SavedAddress {
            recipient_name: r.try_get("recipient_name")?,
            tel: r.try_get("tel")?,
            addr: r.try_get("addr")?,
            postcode: r.try_get("postcode")?,
        }))
    }

    /// Save or replace a shopper's shipping profile. Rows are created the
    /// first time a shopper completes checkout.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn save_address(
        &self,
        email: &Email,
        address: &SavedAddress,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO users (email, recipient_name, tel, addr, postcode) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (email) DO UPDATE SET \
                 recipient_name = EXCLUDED.recipient_name, \
                 tel = EXCLUDED.tel, \
                 addr = EXCLUDED.addr, \
                 postcode = EXCLUDED.postcode, \
                 updated_at = NOW()",
        )
        .bind(email.as_str())
        .bind(&address.recipient_name)
        .bind(&address.tel)
        .bind(&address.addr)
        .bind(&address.postcode)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
