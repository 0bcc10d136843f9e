//! Naver OAuth provider.
//!
//! Unlike Kakao, Naver requires a client secret and echoes `state` through
//! the token exchange.
//! Docs: <https://developers.naver.com/docs/login/api/api.md>

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use driftwell_core::Email;

use super::{AuthError, BuyerProfile, IdentityProvider, normalize_phone};

const AUTHORIZE_URL: &str = "https://nid.naver.com/oauth2.0/authorize";
const TOKEN_URL: &str = "https://nid.naver.com/oauth2.0/token";
const PROFILE_URL: &str = "https://openapi.naver.com/v1/nid/me";

/// Naver login.
#[derive(Clone)]
pub struct NaverProvider {
    client: reqwest::Client,
    client_id: String,
    client_secret: SecretString,
}

impl NaverProvider {
    /// Create a provider from the configured application credentials.
    #[must_use]
    pub fn new(client: reqwest::Client, client_id: String, client_secret: SecretString) -> Self {
        Self {
            client,
            client_id,
            client_secret,
        }
    }
}

impl IdentityProvider for NaverProvider {
    fn name(&self) -> &'static str {
        "naver"
    }

    fn authorize_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{AUTHORIZE_URL}?response_type=code&client_id={}&redirect_uri={}&state={}",
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state),
        )
    }

    async fn exchange(
        &self,
        code: &str,
        state: &str,
        _redirect_uri: &str,
    ) -> Result<BuyerProfile, AuthError> {
        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", &self.client_id),
                ("client_secret", self.client_secret.expose_secret()),
                ("code", code),
                ("state", state),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Parse(e.to_string()))?;

        let response = self
            .client
            .get(PROFILE_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AuthError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let profile: ProfileResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Parse(e.to_string()))?;

        let inner = profile.response;
        let email = inner.email.ok_or(AuthError::MissingEmail)?;
        let email = Email::parse(&email)?;

        let name = inner
            .name
            .or(inner.nickname)
            .unwrap_or_else(|| email.local_part().to_owned());

        let tel = inner.mobile.map(|p| normalize_phone(&p));

        Ok(BuyerProfile { email, name, tel })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    response: NaverProfile,
}

#[derive(Debug, Deserialize)]
struct NaverProfile {
    email: Option<String>,
    name: Option<String>,
    nickname: Option<String>,
    mobile: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_response_parses() {
        let profile: ProfileResponse = serde_json::from_str(
            r#"{"resultcode":"00","message":"success","response":{"email":"a@b.com","name":"Kim Jiwoo","mobile":"010-1234-5678"}}"#,
        )
        .expect("valid");
        assert_eq!(profile.response.email.as_deref(), Some("a@b.com"));
        assert_eq!(profile.response.mobile.as_deref(), Some("010-1234-5678"));
    }

    #[test]
    fn test_authorize_url_carries_state() {
        let provider = NaverProvider::new(
            reqwest::Client::new(),
            "nv-client".to_owned(),
            SecretString::from("nv-secret"),
        );
        let url = provider.authorize_url("https://shop.example/auth/naver/callback", "xyz");
        assert!(url.contains("client_id=nv-client"));
        assert!(url.contains("state=xyz"));
        assert!(!url.contains("nv-secret"));
    }
}
