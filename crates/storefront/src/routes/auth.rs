//! OAuth login route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::CouponRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::auth::{clear_current_user, set_current_user};
use crate::models::session::{CurrentUser, keys};
use crate::services::auth::{AuthError, BuyerProfile, IdentityProvider};
use crate::state::AppState;

/// Length of the OAuth `state` token.
const STATE_LEN: usize = 32;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub kakao_enabled: bool,
    pub naver_enabled: bool,
}

/// Display the login page.
#[instrument(skip(state))]
pub async fn login_page(State(state): State<AppState>) -> impl IntoResponse {
    LoginTemplate {
        kakao_enabled: state.kakao().is_some(),
        naver_enabled: state.naver().is_some(),
    }
}

/// Query parameters accepted by the login start route.
#[derive(Debug, Deserialize)]
pub struct StartParams {
    /// Path to return to after login.
    pub next: Option<String>,
}

/// Redirect the shopper to the provider's authorization page.
#[instrument(skip(state, session))]
pub async fn start(
    State(state): State<AppState>,
    session: Session,
    Path(provider): Path<String>,
    Query(params): Query<StartParams>,
) -> Result<Redirect, AppError> {
    let oauth_state: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(STATE_LEN)
        .map(char::from)
        .collect();

    session
        .insert(keys::OAUTH_STATE, &oauth_state)
        .await
        .map_err(|e| AppError::Internal(format!("failed to store oauth state: {e}")))?;

    // Only same-site paths are accepted as return targets.
    if let Some(next) = params.next.filter(|n| n.starts_with('/') && !n.starts_with("//")) {
        session
            .insert(keys::LOGIN_REDIRECT, &next)
            .await
            .map_err(|e| AppError::Internal(format!("failed to store redirect: {e}")))?;
    }

    let redirect_uri = callback_uri(&state, &provider);
    let url = match provider.as_str() {
        "kakao" => state
            .kakao()
            .ok_or(AuthError::ProviderNotConfigured("kakao"))?
            .authorize_url(&redirect_uri, &oauth_state),
        "naver" => state
            .naver()
            .ok_or(AuthError::ProviderNotConfigured("naver"))?
            .authorize_url(&redirect_uri, &oauth_state),
        _ => return Err(AuthError::UnknownProvider(provider).into()),
    };

    Ok(Redirect::to(&url))
}

/// Query parameters on the provider callback.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Handle the provider's OAuth callback.
#[instrument(skip(state, session, params))]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
) -> Result<Response, AppError> {
    if let Some(error) = params.error {
        tracing::warn!(
            provider = %provider,
            error = %error,
            description = params.error_description.as_deref().unwrap_or(""),
            "OAuth callback reported an error"
        );
        return Ok(Redirect::to("/auth/login").into_response());
    }

    let (Some(code), Some(cb_state)) = (params.code, params.state) else {
        return Err(AppError::BadRequest("missing code or state".to_owned()));
    };

    let expected: Option<String> = session
        .remove(keys::OAUTH_STATE)
        .await
        .map_err(|e| AppError::Internal(format!("failed to read oauth state: {e}")))?;
    if expected.as_deref() != Some(cb_state.as_str()) {
        return Err(AuthError::StateMismatch.into());
    }

    let redirect_uri = callback_uri(&state, &provider);
    let profile = exchange(&state, &provider, &code, &cb_state, &redirect_uri).await?;

    let user = CurrentUser {
        email: profile.email,
        name: profile.name,
        provider: provider.clone(),
    };

    set_current_user(&session, &user)
        .await
        .map_err(|e| AppError::Internal(format!("failed to store login: {e}")))?;

    tracing::info!(provider = %provider, "Shopper logged in");

    // First login grants the welcome coupon; later logins find it already
    // held. A failed grant must not block the login itself.
    match CouponRepository::new(state.pool())
        .grant_welcome(&user.email, Utc::now())
        .await
    {
        Ok(Some(coupon)) => {
            tracing::info!(discount = %coupon.discount_amount, "Welcome coupon granted");
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(error = %e, "Failed to grant welcome coupon");
        }
    }

    let next: Option<String> = session
        .remove(keys::LOGIN_REDIRECT)
        .await
        .map_err(|e| AppError::Internal(format!("failed to read redirect: {e}")))?;

    Ok(Redirect::to(next.as_deref().unwrap_or("/")).into_response())
}

/// Log the shopper out.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear login: {e}")))?;
    Ok(Redirect::to("/"))
}

fn callback_uri(state: &AppState, provider: &str) -> String {
    format!("{}/auth/{provider}/callback", state.config().base_url)
}

async fn exchange(
    state: &AppState,
    provider: &str,
    code: &str,
    cb_state: &str,
    redirect_uri: &str,
) -> Result<BuyerProfile, AppError> {
    let profile = match provider {
        "kakao" => {
            state
                .kakao()
                .ok_or(AuthError::ProviderNotConfigured("kakao"))?
                .exchange(code, cb_state, redirect_uri)
                .await?
        }
        "naver" => {
            state
                .naver()
                .ok_or(AuthError::ProviderNotConfigured("naver"))?
                .exchange(code, cb_state, redirect_uri)
                .await?
        }
        _ => return Err(AuthError::UnknownProvider(provider.to_owned()).into()),
    };
    Ok(profile)
}
