//! HTTP route handlers for the admin console.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                      - Dashboard (status counts, recent orders)
//!
//! # Auth
//! GET  /auth/login            - Login page
//! POST /auth/login            - Password login
//! POST /auth/logout           - Logout action
//!
//! # Orders (requires auth)
//! GET  /orders                - Order table, ?status= filter
//! GET  /orders/{id}           - Order detail with actions
//! POST /orders/{id}/ship      - Enter carrier + tracking (paid -> shipping)
//! POST /orders/{id}/status    - Status transition (deliver/complete/cancel)
//! ```

pub mod auth;
pub mod dashboard;
pub mod orders;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create the order management routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::detail))
        .route("/{id}/ship", post(orders::ship))
        .route("/{id}/status", post(orders::update_status))
}

/// Create all routes for the console.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .nest("/auth", auth_routes())
        .nest("/orders", order_routes())
}
