//! Fixed en-US display formatting for dates and prices.

use chrono::{DateTime, Utc};
use icu_decimal::input::Decimal;
use icu_decimal::options::DecimalFormatterOptions;
use icu_decimal::DecimalFormatter;
use icu_locale_core::Locale;

/// Placeholder for absent values in tables.
pub const EM_DASH: &str = "—";

/// `Jun 1, 2024`.
pub fn us_date(value: &DateTime<Utc>) -> String {
    value.format("%b %-d, %Y").to_string()
}

/// Plain number, no grouping: `125.5`, `100`.
pub fn plain_number(value: f64) -> String {
    value.to_string()
}

/// en-US grouped number with at most three fraction digits: `1,234.568`.
pub fn grouped_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let digits = rounded_digits(value);
    match (en_us_formatter(), digits.parse::<Decimal>()) {
        (Some(formatter), Ok(decimal)) => formatter.format(&decimal).to_string(),
        _ => digits,
    }
}

/// `value` rounded to three fraction digits, trailing zeros and negative zero dropped.
fn rounded_digits(value: f64) -> String {
    let fixed = format!("{:.3}", value.abs());
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if value < 0.0 && trimmed != "0" {
        format!("-{trimmed}")
    } else {
        trimmed.to_string()
    }
}

fn en_us_formatter() -> Option<DecimalFormatter> {
    let locale: Locale = "en-US".parse().ok()?;
    DecimalFormatter::try_new(locale.into(), DecimalFormatterOptions::default()).ok()
}
