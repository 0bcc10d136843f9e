//! User domain types.

use serde::{Deserialize, Serialize};

/// A shopper's saved shipping profile.
///
/// Written on every successful checkout and used to prefill the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAddress {
    /// Recipient name.
    pub recipient_name: String,
    /// Contact phone number.
    pub tel: String,
    /// Street address.
    pub addr: String,
    /// Postal code.
    pub postcode: String,
}
