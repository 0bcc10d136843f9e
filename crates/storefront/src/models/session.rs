//! Session-related types.
//!
//! Types stored in the session for authentication and checkout state.

use serde::{Deserialize, Serialize};

use driftwell_core::Email;

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in shopper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Email reported by the OAuth provider.
    pub email: Email,
    /// Display name reported by the provider.
    pub name: String,
    /// Which provider authenticated this shopper ("kakao" or "naver").
    pub provider: String,
}

/// Session keys for authentication and checkout data.
pub mod keys {
    /// Key for storing the current logged-in shopper.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the shopping cart.
    pub const CART: &str = "cart";

    /// Key for the staged pending order awaiting payment verification.
    pub const PENDING_ORDER: &str = "pending_order";

    /// Key for a one-shot payment failure message, read and removed by
    /// the completion page after the redirect artifacts are stripped.
    pub const CHECKOUT_ERROR: &str = "checkout_error";

    /// Key for OAuth state (CSRF protection).
    pub const OAUTH_STATE: &str = "oauth_state";

    /// Key for the post-login return path.
    pub const LOGIN_REDIRECT: &str = "login_redirect";
}
