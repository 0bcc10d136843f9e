//! Home page and health check.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::catalog::{self, Product};
use crate::filters;
use crate::middleware::auth::OptionalAuth;
use crate::models::session::CurrentUser;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub product: &'static Product,
    pub user: Option<CurrentUser>,
}

/// Display the home page.
#[instrument(skip(user))]
pub async fn home(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    HomeTemplate {
        product: catalog::featured(),
        user,
    }
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "ok"
}
