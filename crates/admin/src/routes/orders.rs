//! Order table and per-order fulfilment actions.
//!
//! Transitions are validated against the status state machine before the
//! conditional update runs, and the update itself re-checks the expected
//! status at the row. An action that loses that race is reported, never
//! silently applied.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use driftwell_core::{Order, OrderId, OrderStatus, tracking};

use crate::db::{OrderAdminRepository, RepositoryError};
use crate::error::AdminError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Query parameters for the order table.
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
}

/// Order table template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub admin: CurrentAdmin,
    pub orders: Vec<Order>,
    pub active_status: Option<OrderStatus>,
    pub statuses: Vec<OrderStatus>,
}

/// Display the order table, optionally filtered to one status.
#[instrument(skip(state, admin))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(query): Query<OrdersQuery>,
) -> Result<OrdersTemplate, AdminError> {
    let active_status = query
        .status
        .as_deref()
        .map(|s| {
            OrderStatus::parse(s)
                .map_err(|e| AdminError::BadRequest(format!("unknown status filter: {e}")))
        })
        .transpose()?;

    let orders = OrderAdminRepository::new(state.pool())
        .list(active_status)
        .await?;

    Ok(OrdersTemplate {
        admin,
        orders,
        active_status,
        statuses: vec![
            OrderStatus::Paid,
            OrderStatus::Shipping,
            OrderStatus::Delivered,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ],
    })
}

/// Order detail template with the actions the current status allows.
#[derive(Template, WebTemplate)]
#[template(path = "orders/detail.html")]
pub struct OrderDetailTemplate {
    pub admin: CurrentAdmin,
    pub order: Order,
    pub tracking_link: Option<String>,
    pub carriers: &'static [&'static str],
    pub can_ship: bool,
    pub can_deliver: bool,
    pub can_complete: bool,
    pub can_cancel: bool,
}

/// Display one order with its fulfilment actions.
#[instrument(skip(state, admin))]
pub async fn detail(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<Uuid>,
) -> Result<OrderDetailTemplate, AdminError> {
    let id = OrderId::new(id);
    let order = OrderAdminRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AdminError::NotFound(format!("order {id}")))?;

    let tracking_link = order
        .carrier
        .as_deref()
        .zip(order.tracking_number.as_deref())
        .and_then(|(carrier, number)| tracking::tracking_url(carrier, number));

    Ok(OrderDetailTemplate {
        admin,
        tracking_link,
        carriers: &tracking::CARRIERS,
        can_ship: order.status == OrderStatus::Paid,
        can_deliver: order.status.can_transition_to(OrderStatus::Delivered),
        can_complete: order.status.can_transition_to(OrderStatus::Completed),
        can_cancel: order.status.is_cancellable(),
        order,
    })
}

/// Shipment form payload.
#[derive(Debug, Deserialize)]
pub struct ShipForm {
    pub carrier: String,
    pub tracking_number: String,
}

/// Record carrier and tracking number, moving the order to `shipping`.
#[instrument(skip(state, admin, form))]
pub async fn ship(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<Uuid>,
    Form(form): Form<ShipForm>,
) -> Result<Redirect, AdminError> {
    let id = OrderId::new(id);
    let carrier = form.carrier.trim();
    let tracking_number = form.tracking_number.trim();

    if !tracking::CARRIERS.contains(&carrier) {
        return Err(AdminError::BadRequest(format!("unknown carrier: {carrier}")));
    }
    if tracking_number.is_empty() {
        return Err(AdminError::BadRequest(
            "tracking number is required".to_string(),
        ));
    }

    OrderAdminRepository::new(state.pool())
        .set_tracking(id, carrier, tracking_number)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AdminError::TransitionRejected("order is not awaiting shipment".to_string())
            }
            other => AdminError::Database(other),
        })?;

    tracing::info!(order_id = %id, operator = %admin.email, carrier, "order shipped");
    Ok(Redirect::to(&format!("/orders/{id}")))
}

/// Status change form payload.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub to: String,
}

/// Apply a status transition (deliver, complete, or cancel).
///
/// The shipping transition goes through [`ship`] instead so it always
/// carries tracking data.
#[instrument(skip(state, admin, form))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<Uuid>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect, AdminError> {
    let id = OrderId::new(id);
    let to = OrderStatus::parse(&form.to)
        .map_err(|e| AdminError::BadRequest(format!("unknown status: {e}")))?;

    if to == OrderStatus::Shipping {
        return Err(AdminError::BadRequest(
            "shipping requires carrier and tracking number".to_string(),
        ));
    }

    let repo = OrderAdminRepository::new(state.pool());
    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AdminError::NotFound(format!("order {id}")))?;

    if !order.status.can_transition_to(to) {
        return Err(AdminError::TransitionRejected(format!(
            "{} -> {} is not allowed",
            order.status.as_str(),
            to.as_str()
        )));
    }

    repo.update_status(id, order.status, to)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AdminError::TransitionRejected("order status changed underneath you".to_string())
            }
            other => AdminError::Database(other),
        })?;

    tracing::info!(
        order_id = %id,
        operator = %admin.email,
        from = order.status.as_str(),
        to = to.as_str(),
        "order status updated"
    );
    Ok(Redirect::to(&format!("/orders/{id}")))
}
