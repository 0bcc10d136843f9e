//! Console dashboard: order counts per status and the newest orders.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use driftwell_core::{Order, OrderStatus};

use crate::db::OrderAdminRepository;
use crate::error::AdminError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// A single status tile on the dashboard.
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin: CurrentAdmin,
    pub counts: Vec<StatusCount>,
    pub recent_orders: Vec<Order>,
}

/// Display the dashboard.
#[instrument(skip(state, admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
) -> Result<DashboardTemplate, AdminError> {
    let repo = OrderAdminRepository::new(state.pool());

    let raw_counts = repo.status_counts().await?;
    // Present every status, zero-filled, in state-machine order.
    let counts = [
        OrderStatus::Paid,
        OrderStatus::Shipping,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ]
    .into_iter()
    .map(|status| StatusCount {
        status,
        count: raw_counts
            .iter()
            .find(|(s, _)| *s == status)
            .map_or(0, |(_, c)| *c),
    })
    .collect();

    let mut recent_orders = repo.list(None).await?;
    recent_orders.truncate(10);

    Ok(DashboardTemplate {
        admin,
        counts,
        recent_orders,
    })
}
