//! Driftwell Core - Shared domain types.
//!
//! This crate provides common types used across all Driftwell components:
//! - `storefront` - Public-facing e-commerce site
//! - `admin` - Internal order-management console
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere. In particular, the pricing calculator lives here so the
//! storefront can quote a checkout server-side from the same code the tests
//! exercise.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, money, emails, payment
//!   identifiers, and the order status state machine
//! - [`cart`] - Session cart and line items
//! - [`coupon`] - Coupon grants and eligibility rules
//! - [`order`] - Verified order records
//! - [`pricing`] - The checkout pricing calculator
//! - [`tracking`] - Carrier tracking URL lookup

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod coupon;
pub mod order;
pub mod pricing;
pub mod tracking;
pub mod types;

pub use cart::{Cart, CartItem};
pub use coupon::Coupon;
pub use order::{Order, OrderItemLine};
pub use pricing::{FLAT_SHIPPING_FEE, FREE_SHIPPING_THRESHOLD, Quote, quote};
pub use types::*;
