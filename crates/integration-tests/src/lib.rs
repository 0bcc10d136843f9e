//! Integration tests for Driftwell.
//!
//! The tests in `tests/` drive the real servers over HTTP and are all
//! `#[ignore]`d so `cargo test` stays hermetic.
//!
//! # Running
//!
//! ```bash
//! # Migrate the database, then start both binaries
//! cargo run -p driftwell-cli -- migrate
//! cargo run -p driftwell-storefront &
//! cargo run -p driftwell-admin &
//!
//! # Run the ignored tests
//! cargo test -p driftwell-integration-tests -- --ignored
//! ```
//!
//! Server addresses are configurable via `STOREFRONT_BASE_URL` and
//! `ADMIN_BASE_URL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use reqwest::Client;

/// Base URL of the storefront under test.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Base URL of the admin console under test.
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// HTTP client with a cookie store, so sessions persist across requests.
///
/// # Panics
///
/// Panics if the client cannot be built; in a test that is the right
/// failure mode.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}
