//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::borrow::Borrow;
use std::fmt::Display;

use driftwell_core::Won;

/// Formats a [`Won`] amount as `₩18,000`.
///
/// Template expressions hand over owned values for method-call results
/// and references for plain fields, so the filter accepts both.
///
/// Usage in templates: `{{ total|won }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn won(value: impl Borrow<Won>, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(value.borrow().to_string())
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a timestamp for order listings, e.g. `2025-11-14 09:30`.
///
/// Usage in templates: `{{ order.created_at|order_date }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn order_date(
    value: &chrono::DateTime<chrono::Utc>,
    _env: &dyn askama::Values,
) -> askama::Result<String> {
    Ok(value.format("%Y-%m-%d %H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use askama::Template;

    use driftwell_core::Won;

    use crate::filters;

    #[derive(Template)]
    #[template(source = "{{ unit|won }} / {{ self.line_total()|won }}", ext = "txt")]
    struct PriceLine {
        unit: Won,
    }

    impl PriceLine {
        fn line_total(&self) -> Won {
            Won::new(self.unit.as_i64() * 2)
        }
    }

    #[test]
    fn test_won_filter_accepts_owned_and_borrowed_amounts() {
        // `unit` reaches the filter as a reference, the method result as
        // an owned value; both must render.
        let line = PriceLine {
            unit: Won::new(18_000),
        };
        assert_eq!(line.render().expect("render"), "₩18,000 / ₩36,000");
    }
}
