//! Operator login and logout.
//!
//! Password auth only. The response for a wrong password and an unknown
//! email is identical.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use driftwell_core::Email;

use crate::db::AdminUserRepository;
use crate::error::AdminError;
use crate::filters;
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
}

/// Render the login page.
pub async fn login_page() -> LoginTemplate {
    LoginTemplate { error: None }
}

/// Login form payload.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Handle a password login attempt.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AdminError> {
    let Ok(email) = Email::parse(form.email.trim()) else {
        return Ok(failed_login().into_response());
    };

    let user = AdminUserRepository::new(state.pool())
        .get_by_email(&email)
        .await?;

    let user = match user {
        Some(user) if user.verify_password(&form.password) => user,
        _ => {
            tracing::warn!(email = %email, "failed login attempt");
            return Ok(failed_login().into_response());
        }
    };

    set_current_admin(&session, &CurrentAdmin::from(&user))
        .await
        .map_err(|e| AdminError::Internal(format!("session write failed: {e}")))?;

    tracing::info!(email = %user.email, "operator logged in");
    Ok(Redirect::to("/").into_response())
}

fn failed_login() -> LoginTemplate {
    LoginTemplate {
        error: Some("Invalid email or password".to_string()),
    }
}

/// Logout and clear the session.
pub async fn logout(session: Session) -> Redirect {
    let _ = clear_current_admin(&session).await;
    Redirect::to("/auth/login")
}
