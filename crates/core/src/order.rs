//! Verified orders.
//!
//! An order row exists only after the payment verifier has confirmed the
//! charge with the processor - there is no speculative or draft order state.
//! `merchant_uid` is unique in the database; that constraint is what makes
//! verification idempotent under duplicate calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, OrderId, OrderStatus, PaymentId, Won};

/// One purchased line, stored as JSON on the order row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemLine {
    /// Product identifier.
    pub id: String,
    /// Display name at time of purchase.
    pub name: String,
    /// Unit price at time of purchase.
    pub amount: Won,
    /// Quantity purchased.
    pub quantity: u32,
}

/// A verified, recorded order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Row id.
    pub id: OrderId,
    /// The payment identifier, as confirmed by the processor.
    pub merchant_uid: PaymentId,
    /// The processor-reported charge. Never the client's claimed figure.
    pub amount: Won,
    /// Buyer name.
    pub buyer_name: String,
    /// Buyer email (links the order to the shopper's history).
    pub buyer_email: Email,
    /// Buyer phone.
    pub buyer_tel: String,
    /// Shipping address.
    pub buyer_addr: String,
    /// Shipping postcode.
    pub buyer_postcode: String,
    /// Purchased lines.
    pub items: Vec<OrderItemLine>,
    /// Delivery memo chosen at checkout.
    pub shipping_memo: String,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Carrier, present once shipping.
    pub carrier: Option<String>,
    /// Tracking number, present once shipping.
    pub tracking_number: Option<String>,
    /// Creation instant (= verification instant).
    pub created_at: DateTime<Utc>,
}
