//! Checkout route handlers.
//!
//! The page collects shipping details and opens the `PortOne` browser SDK.
//! Payment methods that stay on the page call `POST /api/checkout/verify`
//! directly; methods that navigate away (most mobile wallets) come back
//! through `GET /checkout/complete`, which runs the same verification from
//! the staged pending order.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use driftwell_core::{Cart, Coupon, Email, Order, OrderId, PaymentId, pricing};

use crate::db::{CouponRepository, OrderRepository, UserRepository};
use crate::error::{ApiError, AppError};
use crate::filters;
use crate::middleware::auth::RequireAuth;
use crate::models::session::{CurrentUser, keys};
use crate::models::user::SavedAddress;
use crate::routes::cart::{get_cart, save_cart};
use crate::services::checkout::{self, CheckoutForm, PgLedger, VerifiedOrder};
use crate::services::pending::{PendingStore, SessionPendingStore};
use crate::services::portone::BrowserSdkParams;
use crate::state::AppState;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/page.html")]
pub struct CheckoutTemplate {
    pub cart: Cart,
    pub quote: pricing::Quote,
    pub coupons: Vec<Coupon>,
    pub address: Option<SavedAddress>,
    pub user: CurrentUser,
    pub sdk: BrowserSdkParams,
}

/// Display the checkout page.
///
/// The quote shown here is informational; the amount actually charged is
/// fixed when the session is staged.
#[instrument(skip(state, session, user))]
pub async fn page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
) -> Result<Response, AppError> {
    let cart = get_cart(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let now = Utc::now();
    let quote = pricing::quote(cart.items(), None, now);

    let coupons = CouponRepository::new(state.pool())
        .list_for_owner(&user.email)
        .await?
        .into_iter()
        .filter(|c| c.is_usable(now))
        .collect();

    let address = UserRepository::new(state.pool())
        .get_address(&user.email)
        .await?;

    let sdk = state
        .portone()
        .browser_sdk_params(state.config().checkout_return_url());

    Ok(CheckoutTemplate {
        cart,
        quote,
        coupons,
        address,
        user,
        sdk,
    }
    .into_response())
}

/// Request body for staging a checkout.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub coupon_id: Option<i32>,
    pub buyer_name: String,
    pub buyer_tel: String,
    pub buyer_addr: String,
    pub buyer_postcode: String,
    #[serde(default)]
    pub shipping_memo: String,
    #[serde(default)]
    pub save_address: bool,
}

/// Response for a staged checkout: everything the browser SDK needs.
#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub merchant_uid: String,
    pub amount: i64,
    pub order_name: String,
    pub store_id: String,
    pub channel_key: String,
    pub redirect_url: String,
}

/// Stage a pending order and return browser SDK parameters.
///
/// The returned `amount` is the server's quote; the SDK opens the payment
/// window for exactly this figure and verification will hold it to that.
#[instrument(skip(state, session, user, body))]
pub async fn create_session(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, ApiError> {
    let cart = get_cart(&session).await;
    let now = Utc::now();

    let coupon = match body.coupon_id {
        Some(id) => {
            CouponRepository::new(state.pool())
                .get_for_owner(driftwell_core::CouponId::new(id), &user.email)
                .await?
        }
        None => None,
    };

    let form = CheckoutForm {
        buyer_name: body.buyer_name,
        buyer_tel: body.buyer_tel,
        buyer_addr: body.buyer_addr,
        buyer_postcode: body.buyer_postcode,
        shipping_memo: body.shipping_memo,
        save_address: body.save_address,
    };

    let order_name = cart.order_name();
    let pending = checkout::begin_checkout(
        cart.items().to_vec(),
        coupon.as_ref(),
        user.email,
        form,
        now,
    )?;

    SessionPendingStore::new(&session)
        .stage(&pending)
        .await
        .map_err(|e| AppError::Internal(format!("failed to stage pending order: {e}")))?;

    tracing::info!(
        merchant_uid = %pending.merchant_uid,
        amount = %pending.amount,
        "Checkout session staged"
    );

    Ok(Json(CreateSessionResponse {
        merchant_uid: pending.merchant_uid.as_str().to_owned(),
        amount: pending.amount.as_i64(),
        order_name,
        store_id: state.config().portone.store_id.clone(),
        channel_key: state.config().portone.channel_key.clone(),
        redirect_url: state.config().checkout_return_url(),
    }))
}

/// Request body for verifying a payment.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub payment_id: String,
}

/// Response for a verified payment.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub order_id: String,
    pub merchant_uid: String,
    pub amount: i64,
    pub status: String,
}

impl From<&Order> for VerifyResponse {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id.to_string(),
            merchant_uid: order.merchant_uid.as_str().to_owned(),
            amount: order.amount.as_i64(),
            status: order.status.as_str().to_owned(),
        }
    }
}

/// Verify a payment and record the order (inline payment flows).
#[instrument(skip(state, session, user))]
pub async fn verify(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Json(body): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let payment_id = PaymentId::parse(&body.payment_id)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let verified = run_verification(&state, &session, &user.email, &payment_id).await?;

    Ok(Json(VerifyResponse::from(&verified.order)))
}

/// Drop the staged pending order (shopper closed the payment window).
#[instrument(skip(session))]
pub async fn cancel(session: Session) -> Result<StatusCode, ApiError> {
    SessionPendingStore::new(&session)
        .clear()
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear pending order: {e}")))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Query parameters `PortOne` appends when redirecting back.
#[derive(Debug, Deserialize)]
pub struct CompleteParams {
    #[serde(rename = "paymentId")]
    pub payment_id: Option<String>,
    pub code: Option<String>,
    pub message: Option<String>,
}

/// Completion page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/complete.html")]
pub struct CompleteTemplate {
    pub order: Option<Order>,
    pub error: Option<String>,
    pub user: Option<CurrentUser>,
}

/// Resume a checkout after a redirecting payment flow.
///
/// The processor's return parameters never stay in the visible URL: every
/// branch that consumes them answers with a redirect to a clean path, and
/// failure messages travel through a one-shot session entry instead of the
/// query string. With no parameters at all there is nothing to resume, so
/// the shopper lands on the home page unless a failure message is waiting.
///
/// `PortOne` appends `code` and `message` when the payment window failed
/// or was abandoned; in that case the stage is dropped and the shopper
/// sees the message. Otherwise this runs the same verification the inline
/// flow uses.
#[instrument(skip(state, session, user, params))]
pub async fn complete(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Query(params): Query<CompleteParams>,
) -> Result<Response, AppError> {
    if let Some(code) = params.code {
        let message = params.message.unwrap_or_else(|| "Payment failed".to_owned());
        tracing::warn!(code = %code, message = %message, "Payment redirect reported failure");

        SessionPendingStore::new(&session)
            .clear()
            .await
            .map_err(|e| AppError::Internal(format!("failed to clear pending order: {e}")))?;

        stash_failure(&session, message).await?;
        return Ok(Redirect::to("/checkout/complete").into_response());
    }

    if let Some(payment_id) = params.payment_id {
        let payment_id = PaymentId::parse(&payment_id)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        return match run_verification(&state, &session, &user.email, &payment_id).await {
            Ok(verified) => Ok(Redirect::to(&format!(
                "/checkout/complete/{}",
                verified.order.id
            ))
            .into_response()),
            Err(e @ (AppError::PaymentNotConfirmed(_) | AppError::AmountMismatch { .. })) => {
                stash_failure(&session, e.to_string()).await?;
                Ok(Redirect::to("/checkout/complete").into_response())
            }
            Err(e) => Err(e),
        };
    }

    let message: Option<String> = session
        .remove(keys::CHECKOUT_ERROR)
        .await
        .map_err(|e| AppError::Internal(format!("failed to read failure message: {e}")))?;

    match message {
        Some(message) => Ok(CompleteTemplate {
            order: None,
            error: Some(message),
            user: Some(user),
        }
        .into_response()),
        None => Ok(Redirect::to("/").into_response()),
    }
}

/// Show a completed order, looked up by id and scoped to the buyer.
#[instrument(skip(state, user))]
pub async fn completed_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<CompleteTemplate, AppError> {
    let order = OrderRepository::new(state.pool())
        .get_for_buyer(OrderId::new(id), &user.email)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    Ok(CompleteTemplate {
        order: Some(order),
        error: None,
        user: Some(user),
    })
}

async fn stash_failure(session: &Session, message: String) -> Result<(), AppError> {
    session
        .insert(keys::CHECKOUT_ERROR, message)
        .await
        .map_err(|e| AppError::Internal(format!("failed to store failure message: {e}")))
}

/// The shared verification path for both the inline and redirect flows.
///
/// Consumes the staged pending order and runs the pipeline. When nothing
/// is staged (page refresh, replayed redirect) the order table is the
/// fallback: an already-recorded order for this payment id is returned
/// as-is, but only when it belongs to the caller. Payment identifiers are
/// short and guessable, so the fallback never serves another shopper's
/// order.
async fn run_verification(
    state: &AppState,
    session: &Session,
    buyer_email: &Email,
    payment_id: &PaymentId,
) -> Result<VerifiedOrder, AppError> {
    let store = SessionPendingStore::new(session);

    let staged = store
        .take(payment_id)
        .await
        .map_err(|e| AppError::Internal(format!("failed to read pending order: {e}")))?;

    let Some(pending) = staged else {
        if let Some(order) = OrderRepository::new(state.pool())
            .get_for_buyer_by_merchant_uid(payment_id, buyer_email)
            .await?
        {
            return Ok(VerifiedOrder {
                order,
                created: false,
            });
        }
        return Err(AppError::NotFound(format!(
            "no pending checkout for payment {payment_id}"
        )));
    };

    let ledger = PgLedger::new(state.pool());
    let verified =
        checkout::verify_and_record(state.portone(), &ledger, pending, Utc::now()).await?;

    // The purchase went through; the cart is done.
    let mut cart = get_cart(session).await;
    cart.clear();
    if let Err(e) = save_cart(session, &cart).await {
        tracing::warn!("Failed to clear cart after checkout: {e}");
    }

    Ok(verified)
}
