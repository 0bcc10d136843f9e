//! Coupon repository for database operations.
//!
//! One row per issued coupon; `(owner_email, name)` is unique so a shopper
//! can hold each named coupon at most once. Redemption is a conditional
//! update on `used = FALSE`, which makes double-spends lose the race at the
//! database rather than in application logic.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use driftwell_core::{Coupon, CouponId, Email, Won, coupon};

use super::RepositoryError;

const COUPON_COLUMNS: &str =
    "id, owner_email, name, discount_amount, min_order_amount, used, expires_at, created_at";

/// Repository for coupon database operations.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    /// Create a new coupon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Issue a coupon to a shopper.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the shopper already holds a
    /// coupon with this name.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn issue(
        &self,
        owner: &Email,
        name: &str,
        discount_amount: Won,
        min_order_amount: Won,
        expires_at: DateTime<Utc>,
    ) -> Result<Coupon, RepositoryError> {
        let query = format!(
            "INSERT INTO user_coupons (owner_email, name, discount_amount, min_order_amount, expires_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COUPON_COLUMNS}"
        );

        let row = sqlx::query(&query)
            .bind(owner.as_str())
            .bind(name)
            .bind(discount_amount.as_i64())
            .bind(min_order_amount.as_i64())
            .bind(expires_at)
            .fetch_one(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict(format!(
                        "coupon '{name}' already issued to this shopper"
                    ));
                }
                RepositoryError::Database(e)
            })?;

        row_to_coupon(&row)
    }

    /// Grant the welcome coupon to a shopper if they do not hold it yet.
    ///
    /// Returns `Ok(Some(coupon))` for a fresh grant and `Ok(None)` when
    /// the shopper already holds one; the unique index makes repeat calls
    /// (every login, a second seed run) a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails for a
    /// reason other than an existing grant.
    pub async fn grant_welcome(
        &self,
        owner: &Email,
        now: DateTime<Utc>,
    ) -> Result<Option<Coupon>, RepositoryError> {
        let expires_at = now + chrono::Duration::days(coupon::welcome::VALID_DAYS);

        match self
            .issue(
                owner,
                coupon::welcome::NAME,
                coupon::welcome::DISCOUNT,
                coupon::welcome::MIN_ORDER,
                expires_at,
            )
            .await
        {
            Ok(coupon) => Ok(Some(coupon)),
            Err(RepositoryError::Conflict(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// List a shopper's coupons, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_owner(&self, owner: &Email) -> Result<Vec<Coupon>, RepositoryError> {
        let query = format!(
            "SELECT {COUPON_COLUMNS} FROM user_coupons \
             WHERE owner_email = $1 ORDER BY created_at DESC"
        );

        let rows = sqlx::query(&query)
            .bind(owner.as_str())
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(row_to_coupon).collect()
    }

    /// Fetch one of the shopper's coupons by id for checkout. Returns the
    /// coupon regardless of usability; eligibility is the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_owner(
        &self,
        id: CouponId,
        owner: &Email,
    ) -> Result<Option<Coupon>, RepositoryError> {
        let query =
            format!("SELECT {COUPON_COLUMNS} FROM user_coupons WHERE id = $1 AND owner_email = $2");

        let row = sqlx::query(&query)
            .bind(id.as_i32())
            .bind(owner.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(|r| row_to_coupon(&r)).transpose()
    }

    /// Mark a coupon as spent. Conditional on `used = FALSE`, so a coupon
    /// can only be consumed once no matter how many verifications race.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon does not exist,
    /// belongs to someone else, or was already used.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn mark_used(&self, id: CouponId, owner: &Email) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE user_coupons SET used = TRUE \
             WHERE id = $1 AND owner_email = $2 AND used = FALSE",
        )
        .bind(id.as_i32())
        .bind(owner.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

fn row_to_coupon(row: &PgRow) -> Result<Coupon, RepositoryError> {
    let owner: String = row.try_get("owner_email")?;
    let owner = Email::parse(&owner).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid owner email in database: {e}"))
    })?;

    Ok(Coupon {
        id: CouponId::new(row.try_get("id")?),
        owner,
        name: row.try_get("name")?,
        discount_amount: Won::new(row.try_get("discount_amount")?),
        min_order_amount: Won::new(row.try_get("min_order_amount")?),
        used: row.try_get("used")?,
        expires_at: row.try_get("expires_at")?,
        created_at: row.try_get("created_at")?,
    })
}
