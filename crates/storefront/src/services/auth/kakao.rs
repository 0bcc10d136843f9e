//! Kakao OAuth provider.
//!
//! Kakao's REST flow uses only a client id (no secret for web apps).
//! Docs: <https://developers.kakao.com/docs/latest/en/kakaologin/rest-api>

use serde::Deserialize;

use driftwell_core::Email;

use super::{AuthError, BuyerProfile, IdentityProvider, normalize_phone};

const AUTHORIZE_URL: &str = "https://kauth.kakao.com/oauth/authorize";
const TOKEN_URL: &str = "https://kauth.kakao.com/oauth/token";
const USER_ME_URL: &str = "https://kapi.kakao.com/v2/user/me";

/// Kakao login.
#[derive(Clone)]
pub struct KakaoProvider {
    client: reqwest::Client,
    client_id: String,
}

impl KakaoProvider {
    /// Create a provider from the configured REST API key.
    #[must_use]
    pub fn new(client: reqwest::Client, client_id: String) -> Self {
        Self { client, client_id }
    }
}

impl IdentityProvider for KakaoProvider {
    fn name(&self) -> &'static str {
        "kakao"
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
        _state: &str,
        redirect_uri: &str,
    ) -> Result<BuyerProfile, AuthError> {
        let response = self
            .client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "authorization_code"),
                ("client_id", &self.client_id),
                ("redirect_uri", redirect_uri),
                ("code", code),
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
            .get(USER_ME_URL)
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

        let me: UserMe = response
            .json()
            .await
            .map_err(|e| AuthError::Parse(e.to_string()))?;

        let account = me.kakao_account.ok_or(AuthError::MissingEmail)?;
        let email = account.email.ok_or(AuthError::MissingEmail)?;
        let email = Email::parse(&email)?;

        let name = account
            .profile
            .and_then(|p| p.nickname)
            .unwrap_or_else(|| email.local_part().to_owned());

        let tel = account.phone_number.map(|p| normalize_phone(&p));

        Ok(BuyerProfile { email, name, tel })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserMe {
    kakao_account: Option<KakaoAccount>,
}

#[derive(Debug, Deserialize)]
struct KakaoAccount {
    email: Option<String>,
    phone_number: Option<String>,
    profile: Option<KakaoProfile>,
}

#[derive(Debug, Deserialize)]
struct KakaoProfile {
    nickname: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_encodes_params() {
        let provider = KakaoProvider::new(reqwest::Client::new(), "abc123".to_owned());
        let url = provider.authorize_url("https://shop.example/auth/kakao/callback", "st&ate");
        assert!(url.starts_with("https://kauth.kakao.com/oauth/authorize?response_type=code"));
        assert!(url.contains("client_id=abc123"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fshop.example%2Fauth%2Fkakao%2Fcallback"));
        assert!(url.contains("state=st%26ate"));
    }

    #[test]
    fn test_user_me_parses_partial_account() {
        let me: UserMe = serde_json::from_str(
            r#"{"id":1,"kakao_account":{"email":"a@b.com","profile":{"nickname":"Jiwoo"}}}"#,
        )
        .expect("valid");
        let account = me.kakao_account.expect("account");
        assert_eq!(account.email.as_deref(), Some("a@b.com"));
        assert!(account.phone_number.is_none());
    }
}
