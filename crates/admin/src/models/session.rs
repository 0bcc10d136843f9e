//! Session key constants for the admin console.

/// Session storage keys.
pub mod session_keys {
    /// The logged-in operator, set after a successful password check.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
