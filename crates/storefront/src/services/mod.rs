//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - OAuth login (Kakao, Naver)
//! - `checkout` - Pricing, staging and the payment verification pipeline
//! - `pending` - Session-backed staging of the order awaiting verification
//! - `portone` - `PortOne` payment API client

pub mod auth;
pub mod checkout;
pub mod pending;
pub mod portone;
