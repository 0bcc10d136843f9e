//! Pending order staging.
//!
//! Between "shopper clicked pay" and "server verified the payment" the
//! order exists only as a staged [`PendingOrder`]. Mobile payment flows
//! leave the page entirely and come back via redirect, so the stage has to
//! survive a full navigation: it lives in the server-side session, keyed
//! by the payment identifier it was staged under.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_sessions::Session;

use driftwell_core::{CartItem, CouponId, Email, PaymentId, Won};

use crate::models::session::keys;

/// Errors from the pending order store.
#[derive(Debug, Error)]
pub enum PendingStoreError {
    /// Session load or save failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// An order staged at checkout, awaiting payment verification.
///
/// `amount` is the server-computed charge from the pricing calculator.
/// Verification compares the processor's reported total against this
/// value, never against anything the client sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingOrder {
    /// Payment identifier this stage is keyed under.
    pub merchant_uid: PaymentId,
    /// Expected charge, computed server-side at staging time.
    pub amount: Won,
    /// Cart snapshot at staging time.
    pub items: Vec<CartItem>,
    /// Recipient name.
    pub buyer_name: String,
    /// Buyer email (the logged-in shopper).
    pub buyer_email: Email,
    /// Contact phone number.
    pub buyer_tel: String,
    /// Shipping address.
    pub buyer_addr: String,
    /// Postal code.
    pub buyer_postcode: String,
    /// Delivery note, empty when none was given.
    pub shipping_memo: String,
    /// Whether the shopper asked to keep this address on their profile.
    pub save_address: bool,
    /// Coupon applied to the quote, to be consumed after verification.
    pub coupon_id: Option<CouponId>,
    /// When this stage was created.
    pub staged_at: DateTime<Utc>,
}

/// Storage for the order staged between checkout and verification.
///
/// One pending order per shopper: staging a new one replaces any previous
/// stage, and `take` consumes the stage so a second verification attempt
/// finds nothing.
#[allow(async_fn_in_trait)]
pub trait PendingStore {
    /// Stage a pending order, replacing any existing stage.
    async fn stage(&self, pending: &PendingOrder) -> Result<(), PendingStoreError>;

    /// Consume the stage if it matches `merchant_uid`.
    ///
    /// Returns `None` when nothing is staged or the staged order was keyed
    /// under a different payment identifier. A mismatched stage is left in
    /// place; it belongs to some other in-flight checkout attempt.
    async fn take(
        &self,
        merchant_uid: &PaymentId,
    ) -> Result<Option<PendingOrder>, PendingStoreError>;

    /// Drop the stage unconditionally (payment cancelled or abandoned).
    async fn clear(&self) -> Result<(), PendingStoreError>;
}

/// Session-backed pending order store.
pub struct SessionPendingStore<'a> {
    session: &'a Session,
}

impl<'a> SessionPendingStore<'a> {
    /// Wrap a request session.
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }
}

impl PendingStore for SessionPendingStore<'_> {
    async fn stage(&self, pending: &PendingOrder) -> Result<(), PendingStoreError> {
        self.session.insert(keys::PENDING_ORDER, pending).await?;
        Ok(())
    }

    async fn take(
        &self,
        merchant_uid: &PaymentId,
    ) -> Result<Option<PendingOrder>, PendingStoreError> {
        let staged: Option<PendingOrder> = self.session.get(keys::PENDING_ORDER).await?;

        match staged {
            Some(pending) if pending.merchant_uid == *merchant_uid => {
                self.session
                    .remove::<PendingOrder>(keys::PENDING_ORDER)
                    .await?;
                Ok(Some(pending))
            }
            _ => Ok(None),
        }
    }

    async fn clear(&self) -> Result<(), PendingStoreError> {
        self.session
            .remove::<PendingOrder>(keys::PENDING_ORDER)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! In-memory `PendingStore` for service tests.

    use std::sync::Mutex;

    use super::{PendingOrder, PendingStore, PendingStoreError};
    use driftwell_core::PaymentId;

    #[derive(Default)]
    pub struct MemoryPendingStore {
        slot: Mutex<Option<PendingOrder>>,
    }

    impl PendingStore for MemoryPendingStore {
        async fn stage(&self, pending: &PendingOrder) -> Result<(), PendingStoreError> {
            *self.slot.lock().expect("lock") = Some(pending.clone());
            Ok(())
        }

        async fn take(
            &self,
            merchant_uid: &PaymentId,
        ) -> Result<Option<PendingOrder>, PendingStoreError> {
            let mut slot = self.slot.lock().expect("lock");
            match slot.as_ref() {
                Some(pending) if pending.merchant_uid == *merchant_uid => Ok(slot.take()),
                _ => Ok(None),
            }
        }

        async fn clear(&self) -> Result<(), PendingStoreError> {
            *self.slot.lock().expect("lock") = None;
            Ok(())
        }
    }
}
