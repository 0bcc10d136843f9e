//! OAuth login.
//!
//! Shoppers sign in with Kakao or Naver. Both providers follow the same
//! authorization-code shape, captured by [`IdentityProvider`]; the routes
//! only know the provider's name and the two trait methods.
//!
//! The storefront keeps no password material. What a provider vouches for
//! (email, display name, phone if shared) is all the identity there is.

mod error;
mod kakao;
mod naver;

pub use error::AuthError;
pub use kakao::KakaoProvider;
pub use naver::NaverProvider;

use driftwell_core::Email;

/// The shopper profile a provider vouches for.
#[derive(Debug, Clone)]
pub struct BuyerProfile {
    /// Verified email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Phone number in local `010-XXXX-XXXX` form, when the provider
    /// shared one.
    pub tel: Option<String>,
}

/// An OAuth identity provider.
#[allow(async_fn_in_trait)]
pub trait IdentityProvider {
    /// Provider name as used in URLs and session state ("kakao", "naver").
    fn name(&self) -> &'static str;

    /// Authorization URL to redirect the shopper to.
    fn authorize_url(&self, redirect_uri: &str, state: &str) -> String;

    /// Exchange an authorization code for the shopper's profile.
    async fn exchange(
        &self,
        code: &str,
        state: &str,
        redirect_uri: &str,
    ) -> Result<BuyerProfile, AuthError>;
}

/// Normalize a provider-reported phone number to local `010-` form.
///
/// Kakao reports numbers as `+82 10-1234-5678`; Naver as `010-1234-5678`.
/// Anything that does not look like a Korean mobile number is passed
/// through unchanged.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix("+82") {
        let rest = rest.trim_start();
        let rest = rest.strip_prefix('0').unwrap_or(rest);
        return format!("0{rest}");
    }
    trimmed.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_kakao_format() {
        assert_eq!(normalize_phone("+82 10-1234-5678"), "010-1234-5678");
        assert_eq!(normalize_phone("+8210-1234-5678"), "010-1234-5678");
    }

    #[test]
    fn test_normalize_local_format_unchanged() {
        assert_eq!(normalize_phone("010-1234-5678"), "010-1234-5678");
    }

    #[test]
    fn test_normalize_other_passthrough() {
        assert_eq!(normalize_phone("+1 555 0100"), "+1 555 0100");
    }
}
