//! The checkout pricing calculator.
//!
//! Pure function from cart + coupon to the final charge. This is the single
//! source of the "expected amount" later compared against the payment
//! processor's authoritative figure, so it runs server-side only and has no
//! side effects. The only clock dependency is the coupon expiry check.

use chrono::{DateTime, Utc};

use crate::cart::CartItem;
use crate::coupon::Coupon;
use crate::types::Won;

/// Merchandise total at or above which shipping is free.
pub const FREE_SHIPPING_THRESHOLD: Won = Won::new(50_000);

/// Flat shipping fee below the free-shipping threshold.
pub const FLAT_SHIPPING_FEE: Won = Won::new(3_000);

/// Breakdown of one checkout quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Sum of `unit_price * quantity` across lines.
    pub merchandise_total: Won,
    /// Discount actually applied (zero if the coupon was ineligible).
    pub coupon_discount: Won,
    /// Shipping fee after the free-shipping threshold.
    pub shipping_fee: Won,
    /// `max(0, merchandise_total - coupon_discount) + shipping_fee`.
    pub final_amount: Won,
}

/// Compute the charge for a cart.
///
/// Rules:
/// - a coupon applies only if it is usable at `now` (not used, not expired)
///   and the merchandise total meets its minimum order amount;
/// - shipping is free at or above [`FREE_SHIPPING_THRESHOLD`], otherwise
///   [`FLAT_SHIPPING_FEE`];
/// - the discount clamps at zero - it can never make the charge negative.
#[must_use]
pub fn quote(items: &[CartItem], coupon: Option<&Coupon>, now: DateTime<Utc>) -> Quote {
    let merchandise_total: Won = items.iter().map(CartItem::line_total).sum();

    let coupon_discount = coupon
        .filter(|c| c.is_usable(now) && c.applies_to(merchandise_total))
        .map_or(Won::ZERO, |c| c.discount_amount);

    let shipping_fee = if merchandise_total >= FREE_SHIPPING_THRESHOLD {
        Won::ZERO
    } else {
        FLAT_SHIPPING_FEE
    };

    let final_amount = merchandise_total.saturating_sub_floor_zero(coupon_discount) + shipping_fee;

    Quote {
        merchandise_total,
        coupon_discount,
        shipping_fee,
        final_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CouponId, Email};
    use chrono::Duration;

    fn item(price: i64, quantity: u32) -> CartItem {
        CartItem {
            id: format!("sku-{price}"),
            name: "item".to_owned(),
            unit_price: Won::new(price),
            quantity,
            image_ref: String::new(),
        }
    }

    fn coupon(discount: i64, min_order: i64) -> Coupon {
        Coupon {
            id: CouponId::new(1),
            owner: Email::parse("buyer@driftwell.shop").expect("valid"),
            name: "welcome".to_owned(),
            discount_amount: Won::new(discount),
            min_order_amount: Won::new(min_order),
            used: false,
            expires_at: Utc::now() + Duration::days(30),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_single_item_no_coupon_below_threshold() {
        // 19,800 cart: 3,000 shipping applies.
        let q = quote(&[item(19800, 1)], None, Utc::now());
        assert_eq!(q.merchandise_total, Won::new(19800));
        assert_eq!(q.coupon_discount, Won::ZERO);
        assert_eq!(q.shipping_fee, Won::new(3000));
        assert_eq!(q.final_amount, Won::new(22800));
    }

    #[test]
    fn test_coupon_with_no_minimum() {
        let c = coupon(3000, 0);
        let q = quote(&[item(19800, 1)], Some(&c), Utc::now());
        assert_eq!(q.coupon_discount, Won::new(3000));
        assert_eq!(q.final_amount, Won::new(19800));
    }

    #[test]
    fn test_free_shipping_at_threshold() {
        let q = quote(&[item(60000, 1)], None, Utc::now());
        assert_eq!(q.shipping_fee, Won::ZERO);
        assert_eq!(q.final_amount, Won::new(60000));

        let c = coupon(5000, 0);
        let q = quote(&[item(60000, 1)], Some(&c), Utc::now());
        assert_eq!(q.shipping_fee, Won::ZERO);
        assert_eq!(q.final_amount, Won::new(55000));
    }

    #[test]
    fn test_ineligible_coupon_never_discounts() {
        // Minimum order above the cart total: discount must not apply.
        let c = coupon(3000, 50000);
        let q = quote(&[item(19800, 1)], Some(&c), Utc::now());
        assert_eq!(q.coupon_discount, Won::ZERO);
        assert_eq!(q.final_amount, Won::new(22800));
    }

    #[test]
    fn test_expired_coupon_never_discounts() {
        let mut c = coupon(3000, 0);
        c.expires_at = Utc::now() - Duration::days(1);
        let q = quote(&[item(19800, 1)], Some(&c), Utc::now());
        assert_eq!(q.coupon_discount, Won::ZERO);
    }

    #[test]
    fn test_used_coupon_never_discounts() {
        let mut c = coupon(3000, 0);
        c.used = true;
        let q = quote(&[item(19800, 1)], Some(&c), Utc::now());
        assert_eq!(q.coupon_discount, Won::ZERO);
    }

    #[test]
    fn test_discount_clamps_at_zero() {
        // Oversized discount: charge floors at zero plus shipping.
        let c = coupon(10000, 0);
        let q = quote(&[item(5000, 1)], Some(&c), Utc::now());
        assert_eq!(q.final_amount, FLAT_SHIPPING_FEE);
    }

    #[test]
    fn test_totals_are_sums() {
        let q = quote(&[item(1000, 3), item(2500, 2)], None, Utc::now());
        assert_eq!(q.merchandise_total, Won::new(8000));
    }

    #[test]
    fn test_final_amount_never_negative() {
        for (price, qty, discount) in [(0, 1, 100_000), (100, 5, 99_999), (50_000, 1, 1_000_000)] {
            let c = coupon(discount, 0);
            let q = quote(&[item(price, qty)], Some(&c), Utc::now());
            assert!(q.final_amount >= Won::ZERO);
        }
    }

    #[test]
    fn test_empty_cart_quotes_shipping_only() {
        // Checkout rejects empty carts before quoting; the function itself
        // still behaves sanely.
        let q = quote(&[], None, Utc::now());
        assert_eq!(q.merchandise_total, Won::ZERO);
        assert_eq!(q.final_amount, FLAT_SHIPPING_FEE);
    }
}
