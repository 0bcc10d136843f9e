//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::Path;
use tracing::instrument;

use crate::catalog::{self, Product};
use crate::error::AppError;
use crate::filters;
use crate::middleware::auth::OptionalAuth;
use crate::models::session::CurrentUser;

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "product.html")]
pub struct ProductTemplate {
    pub product: &'static Product,
    pub user: Option<CurrentUser>,
}

/// Display a product page.
#[instrument(skip(user))]
pub async fn show(
    Path(id): Path<String>,
    OptionalAuth(user): OptionalAuth,
) -> Result<ProductTemplate, AppError> {
    let product = catalog::find(&id).ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductTemplate { product, user })
}
