//! Operator-side order repository.
//!
//! Every mutation here is a single conditional `UPDATE ... WHERE status =
//! $expected`. Two operators acting on the same order race at the row: the
//! second update matches zero rows and surfaces as `NotFound`, which the
//! routes report back instead of silently double-applying.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use driftwell_core::{Email, Order, OrderId, OrderItemLine, OrderStatus, PaymentId, Won};

use super::RepositoryError;

const ORDER_COLUMNS: &str = "id, merchant_uid, amount, buyer_name, buyer_email, buyer_tel, \
     buyer_addr, buyer_postcode, items, shipping_memo, status, carrier, tracking_number, \
     created_at";

/// Repository for operator order management.
pub struct OrderAdminRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderAdminRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders newest first, optionally restricted to one status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        let rows = if let Some(status) = status {
            let query = format!(
                "SELECT {ORDER_COLUMNS} FROM orders WHERE status = $1 ORDER BY created_at DESC"
            );
            sqlx::query(&query)
                .bind(status.as_str())
                .fetch_all(self.pool)
                .await?
        } else {
            let query = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC");
            sqlx::query(&query).fetch_all(self.pool).await?
        };

        rows.iter().map(row_to_order).collect()
    }

    /// Get an order by its internal id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let query = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");

        let row = sqlx::query(&query)
            .bind(id.as_uuid())
            .fetch_optional(self.pool)
            .await?;

        row.map(|r| row_to_order(&r)).transpose()
    }

    /// Count orders per status, for the dashboard.
    ///
    /// Unknown status strings are skipped; the CHECK constraint should make
    /// that impossible.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn status_counts(&self) -> Result<Vec<(OrderStatus, i64)>, RepositoryError> {
        let rows = sqlx::query("SELECT status, COUNT(*) AS count FROM orders GROUP BY status")
            .fetch_all(self.pool)
            .await?;

        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            let status: String = row.try_get("status")?;
            if let Ok(status) = OrderStatus::parse(&status) {
                counts.push((status, row.try_get("count")?));
            }
        }
        Ok(counts)
    }

    /// Transition an order's status, but only if its current status is
    /// `from`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no row matched (order gone,
    /// or its status already moved on).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2 AND status = $3")
            .bind(to.as_str())
            .bind(id.as_uuid())
            .bind(from.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Record shipment: set the carrier and tracking number and move the
    /// order from `paid` to `shipping` in the same statement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order is not currently
    /// `paid`.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_tracking(
        &self,
        id: OrderId,
        carrier: &str,
        tracking_number: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET carrier = $1, tracking_number = $2, status = $3 \
             WHERE id = $4 AND status = $5",
        )
        .bind(carrier)
        .bind(tracking_number)
        .bind(OrderStatus::Shipping.as_str())
        .bind(id.as_uuid())
        .bind(OrderStatus::Paid.as_str())
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
