//! Core type definitions.
//!
//! Newtype wrappers that make invalid states unrepresentable:
//! - [`id`] - Type-safe entity IDs
//! - [`money`] - Integer KRW amounts
//! - [`email`] - Validated email addresses
//! - [`payment`] - Payment identifiers (merchant UIDs)
//! - [`status`] - Order status state machine

pub mod email;
pub mod id;
pub mod money;
pub mod payment;
pub mod status;

pub use email::{Email, EmailError};
pub use id::{AdminUserId, CouponId, OrderId, UserId};
pub use money::Won;
pub use payment::{PaymentId, PaymentIdError};
pub use status::{OrderStatus, StatusError};
