//! `PortOne` payment API client.
//!
//! The browser SDK opens the payment window; this client is the server's
//! side of the conversation. After the shopper pays (or claims to have
//! paid), the server asks `PortOne` for the authoritative payment record
//! and trusts nothing else.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use driftwell_core::{PaymentId, Won};

use crate::config::PortOneConfig;

/// Errors that can occur when interacting with the `PortOne` API.
#[derive(Debug, Error)]
pub enum PortOneError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// No payment exists for this identifier.
    #[error("payment not found: {0}")]
    PaymentNotFound(String),

    /// Failed to build the client or parse a response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// A payment record as reported by the processor.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorPayment {
    /// Payment lifecycle status, e.g. `PAID`, `FAILED`, `CANCELLED`.
    pub status: String,
    /// Amounts for this payment.
    pub amount: ProcessorAmount,
}

/// The amount block of a processor payment record.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorAmount {
    /// Total charged amount in won.
    pub total: i64,
}

impl ProcessorPayment {
    /// Whether the processor considers this payment settled.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.status == "PAID"
    }

    /// The charged total as a `Won` amount.
    #[must_use]
    pub const fn total(&self) -> Won {
        Won::new(self.amount.total)
    }
}

/// Parameters the browser SDK needs to open the payment window.
///
/// Public identifiers only; the API secret never reaches a template.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BrowserSdkParams {
    /// `PortOne` store id.
    pub store_id: String,
    /// Payment channel key.
    pub channel_key: String,
    /// Redirect target for payment windows that leave the page.
    pub redirect_url: String,
}

/// `PortOne` API client.
#[derive(Clone)]
pub struct PortOneClient {
    client: reqwest::Client,
    api_base: String,
    store_id: String,
    channel_key: String,
}

/// Upper bound on any single processor call. A stalled processor is a
/// failed verification, never an assumed success.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

impl PortOneClient {
    /// Create a new `PortOne` API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &PortOneConfig) -> Result<Self, PortOneError> {
        Self::with_timeout(config, REQUEST_TIMEOUT)
    }

    fn with_timeout(config: &PortOneConfig, timeout: Duration) -> Result<Self, PortOneError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("PortOne {}", config.api_secret.expose_secret());
        let mut auth_value = HeaderValue::from_str(&auth_value)
            .map_err(|e| PortOneError::Parse(format!("invalid API secret format: {e}")))?;
        auth_value.set_sensitive(true);
        headers.insert("Authorization", auth_value);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base.clone(),
            store_id: config.store_id.clone(),
            channel_key: config.channel_key.clone(),
        })
    }

    /// Fetch the authoritative record for a payment.
    ///
    /// # Errors
    ///
    /// Returns `PortOneError::PaymentNotFound` if the processor has no
    /// record of this identifier, `PortOneError::Api` for other error
    /// responses.
    pub async fn get_payment(
        &self,
        payment_id: &PaymentId,
    ) -> Result<ProcessorPayment, PortOneError> {
        let url = format!(
            "{}/payments/{}",
            self.api_base,
            urlencoding::encode(payment_id.as_str())
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(PortOneError::PaymentNotFound(
                payment_id.as_str().to_owned(),
            ));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PortOneError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| PortOneError::Parse(e.to_string()))
    }

    /// Parameters for the browser SDK, with the given redirect target.
    #[must_use]
    pub fn browser_sdk_params(&self, redirect_url: String) -> BrowserSdkParams {
        BrowserSdkParams {
            store_id: self.store_id.clone(),
            channel_key: self.channel_key.clone(),
            redirect_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[tokio::test]
    async fn test_stalled_processor_is_a_bounded_failure() {
        // A listener that accepts connections and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let mut open = Vec::new();
            loop {
                if let Ok((socket, _)) = listener.accept().await {
                    open.push(socket);
                }
            }
        });

        let config = PortOneConfig {
            store_id: "store-test".to_owned(),
            channel_key: "channel-test".to_owned(),
            api_secret: SecretString::from("test-secret"),
            api_base: format!("http://{addr}"),
        };
        let client =
            PortOneClient::with_timeout(&config, Duration::from_millis(200)).expect("client");

        let payment_id = PaymentId::parse("ORD-251114-K3QX").expect("valid id");
        let err = client.get_payment(&payment_id).await.unwrap_err();

        assert!(matches!(&err, PortOneError::Http(e) if e.is_timeout()));
    }

    #[test]
    fn test_processor_payment_paid() {
        let payment: ProcessorPayment =
            serde_json::from_str(r#"{"status":"PAID","amount":{"total":22800}}"#)
                .expect("valid payment json");
        assert!(payment.is_paid());
        assert_eq!(payment.total(), Won::new(22800));
    }

    #[test]
    fn test_processor_payment_not_paid() {
        let payment: ProcessorPayment =
            serde_json::from_str(r#"{"status":"FAILED","amount":{"total":0}}"#)
                .expect("valid payment json");
        assert!(!payment.is_paid());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        // The real API returns many more fields than we read.
        let payment: ProcessorPayment = serde_json::from_str(
            r#"{"status":"PAID","amount":{"total":18000,"taxFree":0},"currency":"KRW"}"#,
        )
        .expect("valid payment json");
        assert!(payment.is_paid());
        assert_eq!(payment.total(), Won::new(18000));
    }
}
