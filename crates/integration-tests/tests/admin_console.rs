//! Integration tests for the admin console auth gate.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (cargo run -p driftwell-cli -- migrate)
//! - The console running (cargo run -p driftwell-admin)
//!
//! An operator account is needed only for the logged-in flows, which are
//! covered manually; these tests pin down the unauthenticated surface.

use reqwest::StatusCode;

use driftwell_integration_tests::{admin_base_url, client};

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_health() {
    let client = client();
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/health"))
        .send()
        .await
        .expect("Failed to reach console");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("body"), "ok");
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_orders_redirects_anonymous_to_login() {
    let client = client();
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/orders"))
        .send()
        .await
        .expect("Failed to get orders page");

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.url().path().starts_with("/auth/login"));
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_login_page_renders() {
    let client = client();
    let base_url = admin_base_url();

    let resp = client
        .get(format!("{base_url}/auth/login"))
        .send()
        .await
        .expect("Failed to get login page");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Operator login"));
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_wrong_password_is_rejected() {
    let client = client();
    let base_url = admin_base_url();

    let resp = client
        .post(format!("{base_url}/auth/login"))
        .form(&[
            ("email", "nobody@driftwell.shop"),
            ("password", "definitely-wrong"),
        ])
        .send()
        .await
        .expect("Failed to post login");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Invalid email or password"));

    // And the session must not have been established.
    let resp = client
        .get(format!("{base_url}/orders"))
        .send()
        .await
        .expect("Failed to get orders page");
    assert!(resp.url().path().starts_with("/auth/login"));
}
