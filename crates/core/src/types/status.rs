//! Order status state machine.
//!
//! An order is created in `Paid` (only after server-side payment
//! verification - there is no earlier persisted state) and moves forward one
//! step at a time:
//!
//! ```text
//! paid --(tracking info entered)--> shipping --(manual mark)--> delivered
//!      --(buyer confirms)--> completed
//! paid     --(operator cancels)--> cancelled
//! shipping --(operator cancels)--> cancelled
//! ```
//!
//! Cancellation from `delivered` or `completed` is not permitted: fulfillment
//! is irreversible. Every transition in the database is a single conditional
//! update guarded by the current status, with this enum as the source of truth
//! for which transitions exist.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error for an unknown status string in the database.
#[derive(thiserror::Error, Debug, Clone)]
#[error("unknown order status: {0}")]
pub struct StatusError(pub String);

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Payment verified, order recorded. The only creation state.
    Paid,
    /// Carrier and tracking number entered by an operator.
    Shipping,
    /// Marked delivered by an operator.
    Delivered,
    /// Purchase confirmed by the buyer.
    Completed,
    /// Cancelled by an operator before delivery.
    Cancelled,
}

impl OrderStatus {
    /// The string stored in the database `status` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Shipping => "shipping",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a status from its database representation.
    ///
    /// # Errors
    ///
    /// Returns [`StatusError`] for an unrecognized string.
    pub fn parse(s: &str) -> Result<Self, StatusError> {
        match s {
            "paid" => Ok(Self::Paid),
            "shipping" => Ok(Self::Shipping),
            "delivered" => Ok(Self::Delivered),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(StatusError(other.to_owned())),
        }
    }

    /// Whether the state machine permits moving from `self` to `next`.
    ///
    /// Forward transitions advance exactly one step; cancellation is allowed
    /// only from `Paid` and `Shipping`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Paid, Self::Shipping)
                | (Self::Shipping, Self::Delivered)
                | (Self::Delivered, Self::Completed)
                | (Self::Paid | Self::Shipping, Self::Cancelled)
        )
    }

    /// Whether an operator may still cancel an order in this status.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Paid | Self::Shipping)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [OrderStatus; 5] = [
        OrderStatus::Paid,
        OrderStatus::Shipping,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    #[test]
    fn test_forward_path() {
        assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Shipping));
        assert!(OrderStatus::Shipping.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Completed));
    }

    #[test]
    fn test_cancellation_rules() {
        assert!(OrderStatus::Paid.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Shipping.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_no_skipping_or_reversing() {
        // Exhaustively check that only the five legal edges exist.
        let legal = [
            (OrderStatus::Paid, OrderStatus::Shipping),
            (OrderStatus::Shipping, OrderStatus::Delivered),
            (OrderStatus::Delivered, OrderStatus::Completed),
            (OrderStatus::Paid, OrderStatus::Cancelled),
            (OrderStatus::Shipping, OrderStatus::Cancelled),
        ];
        for from in ALL {
            for to in ALL {
                let expected = legal.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "transition {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_parse_roundtrip() {
        for status in ALL {
            assert_eq!(
                OrderStatus::parse(status.as_str()).expect("roundtrip"),
                status
            );
        }
        assert!(OrderStatus::parse("refunded").is_err());
    }
}
