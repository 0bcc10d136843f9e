//! Payment identifiers (merchant UIDs).
//!
//! A payment identifier correlates one checkout attempt across three systems:
//! the staged pending order in the session, the payment processor's record,
//! and the final order row's `merchant_uid` column. The format is
//! `ORD-YYMMDD-XXXX`: date-prefixed for human traceability, with a random
//! base-36 suffix for collision resistance. Client-side uniqueness is
//! best-effort only - the `merchant_uid` unique constraint is the backstop.

use core::fmt;

use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Characters used for the random suffix.
const SUFFIX_CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length of the random suffix.
const SUFFIX_LEN: usize = 4;

/// Error for a malformed payment identifier.
#[derive(thiserror::Error, Debug, Clone)]
#[error("malformed payment id: {0}")]
pub struct PaymentIdError(pub String);

/// A payment identifier, e.g. `ORD-251114-K3QX`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    /// Generate a fresh identifier for the given instant.
    #[must_use]
    pub fn generate(now: DateTime<Utc>) -> Self {
        let mut rng = rand::rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| {
                let idx = rng.random_range(0..SUFFIX_CHARSET.len());
                // idx is always within bounds since random_range returns 0..len
                char::from(*SUFFIX_CHARSET.get(idx).unwrap_or(&b'0'))
            })
            .collect();

        Self(format!(
            "ORD-{:02}{:02}{:02}-{suffix}",
            now.year() % 100,
            now.month(),
            now.day()
        ))
    }

    /// Parse an identifier received from the outside (redirect query params,
    /// API request bodies).
    ///
    /// # Errors
    ///
    /// Returns [`PaymentIdError`] if the input does not match the
    /// `ORD-YYMMDD-XXXX` shape.
    pub fn parse(s: &str) -> Result<Self, PaymentIdError> {
        let malformed = || PaymentIdError(s.to_owned());

        let rest = s.strip_prefix("ORD-").ok_or_else(malformed)?;
        let (date, suffix) = rest.split_once('-').ok_or_else(malformed)?;

        if date.len() != 6 || !date.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        if suffix.len() != SUFFIX_LEN
            || !suffix
                .bytes()
                .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
        {
            return Err(malformed());
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PaymentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generated_format() {
        let now = Utc.with_ymd_and_hms(2025, 11, 14, 12, 0, 0).single().expect("valid");
        let id = PaymentId::generate(now);
        let s = id.as_str();
        assert!(s.starts_with("ORD-251114-"), "unexpected id: {s}");
        assert_eq!(s.len(), "ORD-251114-XXXX".len());
    }

    #[test]
    fn test_generated_parses() {
        let id = PaymentId::generate(Utc::now());
        assert_eq!(PaymentId::parse(id.as_str()).expect("valid").as_str(), id.as_str());
    }

    #[test]
    fn test_rejects_malformed() {
        for bad in [
            "",
            "ORD-",
            "ORD-251114",
            "ORD-251114-",
            "ORD-2511-K3QX",
            "ORD-251114-k3qx",
            "ORD-251114-K3QXZ",
            "XYZ-251114-K3QX",
            "ORD-25111A-K3QX",
        ] {
            assert!(PaymentId::parse(bad).is_err(), "accepted: {bad}");
        }
    }
}
