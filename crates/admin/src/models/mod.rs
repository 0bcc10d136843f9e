//! Domain models for the admin console.

pub mod admin_user;
pub mod session;

pub use admin_user::{AdminRole, AdminUser, CurrentAdmin};
pub use session::session_keys;
