//! Account route handlers (order history, coupons, profile).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::Redirect,
};
use tracing::instrument;
use uuid::Uuid;

use driftwell_core::{Coupon, Order, OrderId, OrderStatus, tracking};

use crate::db::{CouponRepository, OrderRepository, RepositoryError, UserRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::auth::RequireAuth;
use crate::models::session::CurrentUser;
use crate::models::user::SavedAddress;
use crate::state::AppState;

/// Account overview template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub user: CurrentUser,
    pub address: Option<SavedAddress>,
    pub recent_orders: Vec<Order>,
}

/// Display the account overview.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<AccountTemplate, AppError> {
    let address = UserRepository::new(state.pool())
        .get_address(&user.email)
        .await?;

    let mut recent_orders = OrderRepository::new(state.pool())
        .list_for_buyer(&user.email)
        .await?;
    recent_orders.truncate(5);

    Ok(AccountTemplate {
        user,
        address,
        recent_orders,
    })
}

/// Order history template.
#[derive(Template, WebTemplate)]
#[template(path = "account/orders.html")]
pub struct OrdersTemplate {
    pub user: CurrentUser,
    pub orders: Vec<Order>,
}

/// Display the shopper's order history.
#[instrument(skip(state, user))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<OrdersTemplate, AppError> {
    let orders = OrderRepository::new(state.pool())
        .list_for_buyer(&user.email)
        .await?;

    Ok(OrdersTemplate { user, orders })
}

/// Order detail template.
#[derive(Template, WebTemplate)]
#[template(path = "account/order_detail.html")]
pub struct OrderDetailTemplate {
    pub user: CurrentUser,
    pub order: Order,
    pub tracking_link: Option<String>,
    pub confirmable: bool,
}

/// Display one order.
#[instrument(skip(state, user))]
pub async fn order_detail(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<OrderDetailTemplate, AppError> {
    let order = OrderRepository::new(state.pool())
        .get_for_buyer(OrderId::new(id), &user.email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    let tracking_link = match (&order.carrier, &order.tracking_number) {
        (Some(carrier), Some(number)) => tracking::tracking_url(carrier, number),
        _ => None,
    };

    // Confirming receipt is the one transition the buyer drives;
    // cancellations go through the operators.
    let confirmable = order.status == OrderStatus::Delivered;

    Ok(OrderDetailTemplate {
        user,
        order,
        tracking_link,
        confirmable,
    })
}

/// Confirm receipt of a delivered order.
///
/// Moves `delivered` to `completed`. The conditional update is scoped to
/// the buyer and the current status, so a stale page or a double submit
/// surfaces an error instead of overwriting a later state.
#[instrument(skip(state, user))]
pub async fn confirm_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    let result = OrderRepository::new(state.pool())
        .update_status_for_buyer(
            OrderId::new(id),
            &user.email,
            OrderStatus::Delivered,
            OrderStatus::Completed,
        )
        .await;

    match result {
        Ok(()) => Ok(Redirect::to(&format!("/account/orders/{id}"))),
        Err(RepositoryError::NotFound) => Err(AppError::Authorization(
            "order is not awaiting confirmation".to_owned(),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Coupon wallet template.
#[derive(Template, WebTemplate)]
#[template(path = "account/coupons.html")]
pub struct CouponsTemplate {
    pub user: CurrentUser,
    pub coupons: Vec<Coupon>,
}

/// Display the shopper's coupons.
#[instrument(skip(state, user))]
pub async fn coupons(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<CouponsTemplate, AppError> {
    let coupons = CouponRepository::new(state.pool())
        .list_for_owner(&user.email)
        .await?;

    Ok(CouponsTemplate { user, coupons })
}
