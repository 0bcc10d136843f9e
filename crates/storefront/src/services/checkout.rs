//! The checkout and payment verification pipeline.
//!
//! Checkout runs in two server-side steps with a payment window in
//! between:
//!
//! 1. [`begin_checkout`] validates the form, prices the cart with the
//!    server's calculator and stages a [`PendingOrder`] keyed by a fresh
//!    payment identifier. The browser then opens the payment window for
//!    exactly the staged amount.
//! 2. [`verify_and_record`] runs when the browser (or a redirect) comes
//!    back. It fetches the processor's authoritative payment record,
//!    checks status and amount against the stage, and writes the order.
//!
//! The processor and the database are reached through the [`PaymentLookup`]
//! and [`OrderLedger`] traits so the pipeline's decision logic is testable
//! without either.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use driftwell_core::{
    Coupon, CouponId, Email, Order, OrderId, OrderItemLine, OrderStatus, PaymentId, pricing,
};

use crate::db::{CouponRepository, OrderRepository, RepositoryError, UserRepository};
use crate::error::AppError;
use crate::models::user::SavedAddress;
use crate::services::pending::PendingOrder;
use crate::services::portone::{PortOneClient, PortOneError, ProcessorPayment};

/// Read access to the processor's payment records.
#[allow(async_fn_in_trait)]
pub trait PaymentLookup {
    /// Fetch the authoritative record for a payment.
    async fn payment(&self, id: &PaymentId) -> Result<ProcessorPayment, PortOneError>;
}

impl PaymentLookup for PortOneClient {
    async fn payment(&self, id: &PaymentId) -> Result<ProcessorPayment, PortOneError> {
        self.get_payment(id).await
    }
}

/// The database writes that follow a verified payment.
#[allow(async_fn_in_trait)]
pub trait OrderLedger {
    /// Record a verified order. Returns `(order, created)`; `created` is
    /// `false` when the `merchant_uid` was already recorded.
    async fn record_paid(&self, order: &Order) -> Result<(Order, bool), RepositoryError>;

    /// Consume a coupon.
    async fn mark_coupon_used(&self, id: CouponId, owner: &Email) -> Result<(), RepositoryError>;

    /// Save the shopper's shipping profile for next time.
    async fn save_address(
        &self,
        email: &Email,
        address: &SavedAddress,
    ) -> Result<(), RepositoryError>;
}

/// The production ledger, backed by the repositories.
pub struct PgLedger<'a> {
    pool: &'a PgPool,
}

impl<'a> PgLedger<'a> {
    /// Wrap a connection pool.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl OrderLedger for PgLedger<'_> {
    async fn record_paid(&self, order: &Order) -> Result<(Order, bool), RepositoryError> {
        OrderRepository::new(self.pool).insert_paid(order).await
    }

    async fn mark_coupon_used(&self, id: CouponId, owner: &Email) -> Result<(), RepositoryError> {
        CouponRepository::new(self.pool).mark_used(id, owner).await
    }

    async fn save_address(
        &self,
        email: &Email,
        address: &SavedAddress,
    ) -> Result<(), RepositoryError> {
        UserRepository::new(self.pool).save_address(email, address).await
    }
}

/// Checkout form fields, as submitted by the shopper.
#[derive(Debug, Clone)]
pub struct CheckoutForm {
    pub buyer_name: String,
    pub buyer_tel: String,
    pub buyer_addr: String,
    pub buyer_postcode: String,
    pub shipping_memo: String,
    pub save_address: bool,
}

/// Validate the form, price the cart and build the pending order.
///
/// The caller stages the result and hands `merchant_uid` plus `amount` to
/// the browser SDK. Nothing touches the database or the processor here.
///
/// # Errors
///
/// Returns `AppError::EmptyCart` for an empty cart and
/// `AppError::Validation` for missing or oversized form fields.
pub fn begin_checkout(
    items: Vec<driftwell_core::CartItem>,
    coupon: Option<&Coupon>,
    buyer_email: Email,
    form: CheckoutForm,
    now: DateTime<Utc>,
) -> Result<PendingOrder, AppError> {
    if items.is_empty() || items.iter().all(|i| i.quantity == 0) {
        return Err(AppError::EmptyCart);
    }

    validate_field("buyer_name", &form.buyer_name, 100)?;
    validate_field("buyer_tel", &form.buyer_tel, 20)?;
    validate_field("buyer_addr", &form.buyer_addr, 500)?;
    validate_field("buyer_postcode", &form.buyer_postcode, 10)?;

    let quote = pricing::quote(&items, coupon, now);

    // Coupons that contributed nothing are not consumed later.
    let coupon_id = coupon
        .filter(|_| !quote.coupon_discount.is_zero())
        .map(|c| c.id);

    Ok(PendingOrder {
        merchant_uid: PaymentId::generate(now),
        amount: quote.final_amount,
        items,
        buyer_name: form.buyer_name,
        buyer_email,
        buyer_tel: form.buyer_tel,
        buyer_addr: form.buyer_addr,
        buyer_postcode: form.buyer_postcode,
        shipping_memo: form.shipping_memo,
        save_address: form.save_address,
        coupon_id,
        staged_at: now,
    })
}

fn validate_field(field: &'static str, value: &str, max_len: usize) -> Result<(), AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation {
            field,
            message: "must not be empty".to_owned(),
        });
    }
    if trimmed.len() > max_len {
        return Err(AppError::Validation {
            field,
            message: format!("must be at most {max_len} characters"),
        });
    }
    Ok(())
}

/// Outcome of a successful verification.
#[derive(Debug)]
pub struct VerifiedOrder {
    /// The recorded order.
    pub order: Order,
    /// `false` when this payment had already been recorded and the
    /// existing order was returned instead.
    pub created: bool,
}

/// Verify a payment against its staged order and record the result.
///
/// The sequence is fixed:
///
/// 1. ask the processor for the payment record;
/// 2. reject anything whose status is not `PAID`;
/// 3. reject any total that differs from the staged expected amount;
/// 4. insert the order (idempotent on `merchant_uid`);
/// 5. only then consume the coupon and, if the shopper opted in, save the
///    address; both only for a freshly created order.
///
/// Coupon and address writes after a recorded order are best-effort: the
/// payment is real and the order stands, so those failures are logged
/// rather than surfaced.
///
/// # Errors
///
/// Returns `AppError::PaymentNotConfirmed`, `AppError::AmountMismatch` or
/// `AppError::OrderRecording` per the steps above.
pub async fn verify_and_record<P, L>(
    processor: &P,
    ledger: &L,
    pending: PendingOrder,
    now: DateTime<Utc>,
) -> Result<VerifiedOrder, AppError>
where
    P: PaymentLookup,
    L: OrderLedger,
{
    let payment = processor.payment(&pending.merchant_uid).await?;

    if !payment.is_paid() {
        tracing::warn!(
            merchant_uid = %pending.merchant_uid,
            status = %payment.status,
            "Payment not in PAID status"
        );
        return Err(AppError::PaymentNotConfirmed(payment.status));
    }

    if payment.total() != pending.amount {
        tracing::error!(
            merchant_uid = %pending.merchant_uid,
            expected = %pending.amount,
            actual = %payment.total(),
            "Charged amount does not match the staged quote"
        );
        return Err(AppError::AmountMismatch {
            expected: pending.amount,
            actual: payment.total(),
        });
    }

    let items: Vec<OrderItemLine> = pending
        .items
        .iter()
        .map(|i| OrderItemLine {
            id: i.id.clone(),
            name: i.name.clone(),
            amount: i.unit_price,
            quantity: i.quantity,
        })
        .collect();

    let order = Order {
        id: OrderId::new(Uuid::new_v4()),
        merchant_uid: pending.merchant_uid.clone(),
        amount: payment.total(),
        buyer_name: pending.buyer_name.clone(),
        buyer_email: pending.buyer_email.clone(),
        buyer_tel: pending.buyer_tel.clone(),
        buyer_addr: pending.buyer_addr.clone(),
        buyer_postcode: pending.buyer_postcode.clone(),
        items,
        shipping_memo: pending.shipping_memo.clone(),
        status: OrderStatus::Paid,
        carrier: None,
        tracking_number: None,
        created_at: now,
    };

    let (order, created) = ledger
        .record_paid(&order)
        .await
        .map_err(AppError::OrderRecording)?;

    if created {
        if let Some(coupon_id) = pending.coupon_id
            && let Err(e) = ledger.mark_coupon_used(coupon_id, &pending.buyer_email).await
        {
            tracing::error!(
                merchant_uid = %order.merchant_uid,
                coupon_id = %coupon_id,
                error = %e,
                "Failed to consume coupon after recording order"
            );
        }

        if pending.save_address {
            let address = SavedAddress {
                recipient_name: pending.buyer_name,
                tel: pending.buyer_tel,
                addr: pending.buyer_addr,
                postcode: pending.buyer_postcode,
            };
            if let Err(e) = ledger.save_address(&pending.buyer_email, &address).await {
                tracing::warn!(
                    merchant_uid = %order.merchant_uid,
                    error = %e,
                    "Failed to save shipping profile"
                );
            }
        }
    }

    Ok(VerifiedOrder { order, created })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::Duration;
    use driftwell_core::{CartItem, Won};

    use super::*;
    use crate::services::portone::ProcessorAmount;

    fn item(price: i64, quantity: u32) -> CartItem {
        CartItem {
            id: "bodywash-01".to_owned(),
            name: "Driftwell Body Wash".to_owned(),
            unit_price: Won::new(price),
            quantity,
            image_ref: String::new(),
        }
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            buyer_name: "Kim Jiwoo".to_owned(),
            buyer_tel: "010-1234-5678".to_owned(),
            buyer_addr: "12 Mapo-daero, Mapo-gu, Seoul".to_owned(),
            buyer_postcode: "04175".to_owned(),
            shipping_memo: String::new(),
            save_address: true,
        }
    }

    fn email() -> Email {
        Email::parse("jiwoo@example.com").expect("valid")
    }

    fn coupon(discount: i64, min_order: i64) -> Coupon {
        Coupon {
            id: CouponId::new(7),
            owner: email(),
            name: "welcome".to_owned(),
            discount_amount: Won::new(discount),
            min_order_amount: Won::new(min_order),
            used: false,
            expires_at: Utc::now() + Duration::days(30),
            created_at: Utc::now(),
        }
    }

    struct FakeProcessor {
        status: String,
        total: i64,
    }

    impl FakeProcessor {
        fn paid(total: i64) -> Self {
            Self {
                status: "PAID".to_owned(),
                total,
            }
        }
    }

    impl PaymentLookup for FakeProcessor {
        async fn payment(&self, _id: &PaymentId) -> Result<ProcessorPayment, PortOneError> {
            Ok(ProcessorPayment {
                status: self.status.clone(),
                amount: ProcessorAmount { total: self.total },
            })
        }
    }

    #[derive(Default)]
    struct FakeLedger {
        orders: Mutex<Vec<Order>>,
        coupons_used: Mutex<Vec<CouponId>>,
        addresses: Mutex<Vec<SavedAddress>>,
        fail_coupon: bool,
    }

    impl OrderLedger for FakeLedger {
        async fn record_paid(&self, order: &Order) -> Result<(Order, bool), RepositoryError> {
            let mut orders = self.orders.lock().expect("lock");
            if let Some(existing) = orders.iter().find(|o| o.merchant_uid == order.merchant_uid)
            {
                return Ok((existing.clone(), false));
            }
            orders.push(order.clone());
            Ok((order.clone(), true))
        }

        async fn mark_coupon_used(
            &self,
            id: CouponId,
            _owner: &Email,
        ) -> Result<(), RepositoryError> {
            if self.fail_coupon {
                return Err(RepositoryError::NotFound);
            }
            self.coupons_used.lock().expect("lock").push(id);
            Ok(())
        }

        async fn save_address(
            &self,
            _email: &Email,
            address: &SavedAddress,
        ) -> Result<(), RepositoryError> {
            self.addresses.lock().expect("lock").push(address.clone());
            Ok(())
        }
    }

    fn pending(amount: i64, coupon_id: Option<CouponId>) -> PendingOrder {
        PendingOrder {
            merchant_uid: PaymentId::generate(Utc::now()),
            amount: Won::new(amount),
            items: vec![item(19800, 1)],
            buyer_name: "Kim Jiwoo".to_owned(),
            buyer_email: email(),
            buyer_tel: "010-1234-5678".to_owned(),
            buyer_addr: "12 Mapo-daero, Mapo-gu, Seoul".to_owned(),
            buyer_postcode: "04175".to_owned(),
            shipping_memo: String::new(),
            save_address: true,
            coupon_id,
            staged_at: Utc::now(),
        }
    }

    #[test]
    fn test_begin_checkout_prices_server_side() {
        let staged = begin_checkout(vec![item(19800, 1)], None, email(), form(), Utc::now())
            .expect("staged");
        assert_eq!(staged.amount, Won::new(22800));
        assert!(staged.coupon_id.is_none());
        assert!(staged.save_address);
    }

    #[test]
    fn test_begin_checkout_applies_coupon() {
        let c = coupon(3000, 0);
        let staged =
            begin_checkout(vec![item(19800, 1)], Some(&c), email(), form(), Utc::now())
                .expect("staged");
        assert_eq!(staged.amount, Won::new(19800));
        assert_eq!(staged.coupon_id, Some(CouponId::new(7)));
    }

    #[test]
    fn test_begin_checkout_drops_ineligible_coupon() {
        // Minimum order not met: no discount and no pending consumption.
        let c = coupon(3000, 50000);
        let staged =
            begin_checkout(vec![item(19800, 1)], Some(&c), email(), form(), Utc::now())
                .expect("staged");
        assert_eq!(staged.amount, Won::new(22800));
        assert!(staged.coupon_id.is_none());
    }

    #[test]
    fn test_begin_checkout_rejects_empty_cart() {
        let err = begin_checkout(vec![], None, email(), form(), Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::EmptyCart));
    }

    #[test]
    fn test_begin_checkout_rejects_blank_fields() {
        let mut f = form();
        f.buyer_addr = "   ".to_owned();
        let err = begin_checkout(vec![item(19800, 1)], None, email(), f, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation {
                field: "buyer_addr",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_verify_records_order() {
        let processor = FakeProcessor::paid(22800);
        let ledger = FakeLedger::default();

        let verified = verify_and_record(&processor, &ledger, pending(22800, None), Utc::now())
            .await
            .expect("verified");

        assert!(verified.created);
        assert_eq!(verified.order.status, OrderStatus::Paid);
        assert_eq!(verified.order.amount, Won::new(22800));
        assert_eq!(ledger.orders.lock().expect("lock").len(), 1);
        // No coupon was staged, none consumed.
        assert!(ledger.coupons_used.lock().expect("lock").is_empty());
        // The shopper opted in, so the address is kept for next checkout.
        assert_eq!(ledger.addresses.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn test_address_not_saved_without_opt_in() {
        let processor = FakeProcessor::paid(22800);
        let ledger = FakeLedger::default();
        let staged = PendingOrder {
            save_address: false,
            ..pending(22800, None)
        };

        let verified = verify_and_record(&processor, &ledger, staged, Utc::now())
            .await
            .expect("verified");

        assert!(verified.created);
        assert!(ledger.addresses.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn test_verify_is_idempotent() {
        let processor = FakeProcessor::paid(22800);
        let ledger = FakeLedger::default();
        let staged = pending(22800, Some(CouponId::new(7)));

        let first = verify_and_record(&processor, &ledger, staged.clone(), Utc::now())
            .await
            .expect("first");
        let second = verify_and_record(&processor, &ledger, staged, Utc::now())
            .await
            .expect("second");

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.order.merchant_uid, second.order.merchant_uid);
        assert_eq!(ledger.orders.lock().expect("lock").len(), 1);
        // The coupon is consumed once, on the run that created the order.
        assert_eq!(ledger.coupons_used.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn test_verify_rejects_unpaid_status() {
        let processor = FakeProcessor {
            status: "FAILED".to_owned(),
            total: 22800,
        };
        let ledger = FakeLedger::default();

        let err = verify_and_record(&processor, &ledger, pending(22800, None), Utc::now())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PaymentNotConfirmed(s) if s == "FAILED"));
        assert!(ledger.orders.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn test_verify_rejects_amount_mismatch() {
        // Processor says 100 was charged for a 22,800 quote: no order.
        let processor = FakeProcessor::paid(100);
        let ledger = FakeLedger::default();

        let err = verify_and_record(
            &processor,
            &ledger,
            pending(22800, Some(CouponId::new(7))),
            Utc::now(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            AppError::AmountMismatch {
                expected,
                actual,
            } if expected == Won::new(22800) && actual == Won::new(100)
        ));
        assert!(ledger.orders.lock().expect("lock").is_empty());
        assert!(ledger.coupons_used.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn test_coupon_failure_does_not_undo_order() {
        let processor = FakeProcessor::paid(22800);
        let ledger = FakeLedger {
            fail_coupon: true,
            ..FakeLedger::default()
        };

        let verified = verify_and_record(
            &processor,
            &ledger,
            pending(22800, Some(CouponId::new(7))),
            Utc::now(),
        )
        .await
        .expect("order stands");

        assert!(verified.created);
        assert_eq!(ledger.orders.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn test_order_carries_item_snapshot() {
        let processor = FakeProcessor::paid(22800);
        let ledger = FakeLedger::default();

        let verified = verify_and_record(&processor, &ledger, pending(22800, None), Utc::now())
            .await
            .expect("verified");

        assert_eq!(verified.order.items.len(), 1);
        assert_eq!(verified.order.items[0].id, "bodywash-01");
        assert_eq!(verified.order.items[0].amount, Won::new(19800));
    }
}
