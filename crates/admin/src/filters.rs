//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::borrow::Borrow;
use std::fmt::Display;

use driftwell_core::Won;

/// Formats a [`Won`] amount as `₩18,000`. Accepts owned values and
/// references so method-call results work in templates.
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn won(value: impl Borrow<Won>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.borrow().to_string())
}

/// Returns the current year.
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a timestamp for order listings, e.g. `2025-11-14 09:30`.
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn order_date(
    value: &chrono::DateTime<chrono::Utc>,
    _env: &dyn askama::Values,
) -> askama::Result<String> {
    Ok(value.format("%Y-%m-%d %H:%M").to_string())
}
