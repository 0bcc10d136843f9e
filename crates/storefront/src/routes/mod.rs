//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Home page
//! GET  /health                  - Health check
//!
//! # Products
//! GET  /products/{id}           - Product detail
//!
//! # Cart (HTMX fragments)
//! GET  /cart                    - Cart page
//! POST /cart/add                - Add to cart (returns count fragment)
//! POST /cart/update             - Update quantity (returns cart_items fragment)
//! POST /cart/remove             - Remove item (returns cart_items fragment)
//! GET  /cart/count              - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout                - Checkout page (requires auth)
//! GET  /checkout/complete       - Payment window redirect target
//! GET  /checkout/complete/{id}  - Completed order page (clean URL)
//! POST /api/checkout/session    - Stage a pending order, returns SDK params
//! POST /api/checkout/verify     - Verify a payment and record the order
//! POST /api/checkout/cancel     - Drop the staged pending order
//!
//! # Auth
//! GET  /auth/login              - Login page
//! GET  /auth/{provider}         - Redirect to provider OAuth
//! GET  /auth/{provider}/callback - Handle OAuth callback
//! POST /auth/logout             - Logout action
//!
//! # Account (requires auth)
//! GET  /account                 - Account overview
//! GET  /account/orders          - Order history
//! GET  /account/orders/{id}     - Order detail
//! POST /account/orders/{id}/confirm - Confirm receipt of a delivered order
//! GET  /account/coupons         - Coupon wallet
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the checkout API routes router.
pub fn checkout_api_routes() -> Router<AppState> {
    Router::new()
        .route("/session", post(checkout::create_session))
        .route("/verify", post(checkout::verify))
        .route("/cancel", post(checkout::cancel))
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page))
        .route("/logout", post(auth::logout))
        .route("/{provider}", get(auth::start))
        .route("/{provider}/callback", get(auth::callback))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/orders", get(account::orders))
        .route("/orders/{id}", get(account::order_detail))
        .route("/orders/{id}/confirm", post(account::confirm_order))
        .route("/coupons", get(account::coupons))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(home::health))
        .route("/products/{id}", get(products::show))
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::page))
        .route("/checkout/complete", get(checkout::complete))
        .route("/checkout/complete/{id}", get(checkout::completed_order))
        .nest("/api/checkout", checkout_api_routes())
        .nest("/auth", auth_routes())
        .nest("/account", account_routes())
}
