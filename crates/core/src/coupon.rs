//! Coupon grants and eligibility rules.
//!
//! A coupon is granted at most once per (owner, coupon name) - the repository
//! enforces that with a duplicate-issuance check backed by a unique index.
//! It is consumed (marked used) exactly when its order is materialized, never
//! before verification succeeds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CouponId, Email, Won};

/// Terms of the sign-up coupon granted when a shopper first logs in.
pub mod welcome {
    use crate::types::Won;

    /// Grant name; at most one per shopper.
    pub const NAME: &str = "welcome";
    /// Flat discount off the merchandise total.
    pub const DISCOUNT: Won = Won::new(3_000);
    /// No minimum order.
    pub const MIN_ORDER: Won = Won::new(0);
    /// Days from grant to expiry.
    pub const VALID_DAYS: i64 = 30;
}

/// A coupon granted to one shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Row id.
    pub id: CouponId,
    /// Owner's email (the identity the grant is keyed on).
    pub owner: Email,
    /// Grant name, e.g. `welcome`.
    pub name: String,
    /// Flat discount taken off the merchandise total.
    pub discount_amount: Won,
    /// Minimum merchandise total required to apply the coupon.
    pub min_order_amount: Won,
    /// Whether the coupon has been consumed by an order.
    pub used: bool,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Grant instant.
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    /// Whether the coupon can still be selected at all: not consumed and not
    /// expired at `now`.
    #[must_use]
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        !self.used && now <= self.expires_at
    }

    /// Whether the coupon applies to a given merchandise total.
    ///
    /// The same check runs in the UI (to hide ineligible coupons) and again
    /// server-side when quoting, so a tampered form cannot apply an
    /// ineligible coupon.
    #[must_use]
    pub fn applies_to(&self, merchandise_total: Won) -> bool {
        merchandise_total >= self.min_order_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(used: bool, expires_in_days: i64) -> Coupon {
        Coupon {
            id: CouponId::new(1),
            owner: Email::parse("buyer@driftwell.shop").expect("valid"),
            name: "welcome".to_owned(),
            discount_amount: Won::new(3000),
            min_order_amount: Won::new(10000),
            used,
            expires_at: Utc::now() + Duration::days(expires_in_days),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_usable_only_when_fresh() {
        let now = Utc::now();
        assert!(coupon(false, 30).is_usable(now));
        assert!(!coupon(true, 30).is_usable(now));
        assert!(!coupon(false, -1).is_usable(now));
    }

    #[test]
    fn test_min_order_gate() {
        let c = coupon(false, 30);
        assert!(!c.applies_to(Won::new(9999)));
        assert!(c.applies_to(Won::new(10000)));
    }

    #[test]
    fn test_welcome_terms() {
        let now = Utc::now();
        let c = Coupon {
            id: CouponId::new(1),
            owner: Email::parse("buyer@driftwell.shop").expect("valid"),
            name: welcome::NAME.to_owned(),
            discount_amount: welcome::DISCOUNT,
            min_order_amount: welcome::MIN_ORDER,
            used: false,
            expires_at: now + Duration::days(welcome::VALID_DAYS),
            created_at: now,
        };

        // No minimum: the discount applies to even the smallest cart.
        assert!(c.applies_to(Won::new(1)));
        assert_eq!(c.discount_amount, Won::new(3000));
        assert!(c.is_usable(now + Duration::days(welcome::VALID_DAYS)));
        assert!(!c.is_usable(now + Duration::days(welcome::VALID_DAYS + 1)));
    }
}
