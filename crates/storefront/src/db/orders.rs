//! Order repository for database operations.
//!
//! Orders are written exactly once per payment: `merchant_uid` carries a
//! unique constraint and `insert_paid` treats the resulting conflict as
//! "already recorded" rather than an error. Item snapshots are stored as
//! JSONB so an order remains readable after catalog changes.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use driftwell_core::{Email, Order, OrderId, OrderItemLine, OrderStatus, PaymentId, Won};

use super::RepositoryError;

const ORDER_COLUMNS: &str = "id, merchant_uid, amount, buyer_name, buyer_email, buyer_tel, \
     buyer_addr, buyer_postcode, items, shipping_memo, status, carrier, tracking_number, \
     created_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a verified order.
    ///
    /// Returns `(order, true)` when a new row was written and
    /// `(existing, false)` when an order with the same `merchant_uid`
    /// already exists. The second verification of the same payment (tab
    /// refresh on the completion page, redirect replay) must succeed
    /// without creating a duplicate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails for any
    /// reason other than the `merchant_uid` unique constraint.
    pub async fn insert_paid(&self, order: &Order) -> Result<(Order, bool), RepositoryError> {
        let items = serde_json::to_value(&order.items).map_err(|e| {
            RepositoryError::DataCorruption(format!("failed to serialize order items: {e}"))
        })?;

        let query = format!(
            "INSERT INTO orders (id, merchant_uid, amount, buyer_name, buyer_email, buyer_tel, \
             buyer_addr, buyer_postcode, items, shipping_memo, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {ORDER_COLUMNS}"
        );

        let result = sqlx::query(&query)
            .bind(order.id.as_uuid())
            .bind(order.merchant_uid.as_str())
            .bind(order.amount.as_i64())
            .bind(&order.buyer_name)
            .bind(order.buyer_email.as_str())
            .bind(&order.buyer_tel)
            .bind(&order.buyer_addr)
            .bind(&order.buyer_postcode)
            .bind(items)
            .bind(&order.shipping_memo)
            .bind(order.status.as_str())
            .fetch_one(self.pool)
            .await;

        match result {
            Ok(row) => Ok((row_to_order(&row)?, true)),
            Err(e) => {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    let existing = self
                        .get_by_merchant_uid(&order.merchant_uid)
                        .await?
                        .ok_or_else(|| {
                            RepositoryError::DataCorruption(format!(
                                "order {} conflicted on insert but is not readable",
                                order.merchant_uid
                            ))
                        })?;
                    return Ok((existing, false));
                }
                Err(RepositoryError::Database(e))
            }
        }
    }

    /// Get an order by its payment identifier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored field cannot
    /// be decoded.
    pub async fn get_by_merchant_uid(
        &self,
        merchant_uid: &PaymentId,
    ) -> Result<Option<Order>, RepositoryError> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE merchant_uid = $1");

        let row = sqlx::query(&query)
            .bind(merchant_uid.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(|r| row_to_order(&r)).transpose()
    }

    /// Get an order by its payment identifier, scoped to a buyer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_buyer_by_merchant_uid(
        &self,
        merchant_uid: &PaymentId,
        buyer_email: &Email,
    ) -> Result<Option<Order>, RepositoryError> {
        let query = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE merchant_uid = $1 AND buyer_email = $2"
        );

        let row = sqlx::query(&query)
            .bind(merchant_uid.as_str())
            .bind(buyer_email.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(|r| row_to_order(&r)).transpose()
    }

    /// Get an order by its internal id, scoped to a buyer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_buyer(
        &self,
        id: OrderId,
        buyer_email: &Email,
    ) -> Result<Option<Order>, RepositoryError> {
        let query =
            format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND buyer_email = $2");

        let row = sqlx::query(&query)
            .bind(id.as_uuid())
            .bind(buyer_email.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(|r| row_to_order(&r)).transpose()
    }

    /// List a buyer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_buyer(&self, buyer_email: &Email) -> Result<Vec<Order>, RepositoryError> {
        let query = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE buyer_email = $1 ORDER BY created_at DESC"
        );

        let rows = sqlx::query(&query)
            .bind(buyer_email.as_str())
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(row_to_order).collect()
    }

    /// Transition an order's status, but only if its current status is
    /// `from`. Zero affected rows means the order does not exist, is not
    /// owned by `buyer_email`, or has already moved on.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matched.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status_for_buyer(
        &self,
        id: OrderId,
        buyer_email: &Email,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET status = $1 \
             WHERE id = $2 AND buyer_email = $3 AND status = $4",
        )
        .bind(to.as_str())
        .bind(id.as_uuid())
        .bind(buyer_email.as_str())
        .bind(from.as_str())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

fn row_to_order(row: &PgRow) -> Result<Order, RepositoryError> {
    let merchant_uid: String = row.try_get("merchant_uid")?;
    let merchant_uid = PaymentId::parse(&merchant_uid).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid merchant_uid in database: {e}"))
    })?;

    let buyer_email: String = row.try_get("buyer_email")?;
    let buyer_email = Email::parse(&buyer_email).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid buyer email in database: {e}"))
    })?;

    let status: String = row.try_get("status")?;
    let status = OrderStatus::parse(&status)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid status in database: {e}")))?;

    let items: serde_json::Value = row.try_get("items")?;
    let items: Vec<OrderItemLine> = serde_json::from_value(items).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid order items in database: {e}"))
    })?;

    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(Order {
        id: OrderId::new(row.try_get("id")?),
        merchant_uid,
        amount: Won::new(row.try_get("amount")?),
        buyer_name: row.try_get("buyer_name")?,
        buyer_email,
        buyer_tel: row.try_get("buyer_tel")?,
        buyer_addr: row.try_get("buyer_addr")?,
        buyer_postcode: row.try_get("buyer_postcode")?,
        items,
        shipping_memo: row.try_get("shipping_memo")?,
        status,
        carrier: row.try_get("carrier")?,
        tracking_number: row.try_get("tracking_number")?,
        created_at,
    })
}
