//! HTTP middleware for the storefront.

pub mod auth;
pub mod session;
