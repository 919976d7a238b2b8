//! Bid price normalization.
//!
//! Prices travel as strings. Before one reaches the control plane it is
//! reduced to a canonical form: a positive decimal with exactly three
//! fractional digits and no currency symbol or separators (`"$0.08"` becomes
//! `"0.080"`).

use crate::error::ProvisionError;

/// Minimum bid assumed when the control plane cannot report one.
pub const DEFAULT_MIN_BID_PRICE: &str = "0.001";

const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

/// Parse, validate and canonicalize a price string.
///
/// # Errors
/// Returns [`ProvisionError::InvalidPrice`] when no number can be extracted or
/// the value is not greater than zero.
pub fn normalize(raw: &str) -> Result<String, ProvisionError> {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix(CURRENCY_SYMBOLS)
        .unwrap_or(trimmed)
        .trim();

    if trimmed.is_empty() {
        return Err(ProvisionError::invalid_price(raw, "no price given"));
    }

    let value = match parse_finite(trimmed) {
        Some(value) => value,
        None => {
            let scanned = scan_number(trimmed);
            if !scanned.bytes().any(|b| b.is_ascii_digit()) {
                return Err(ProvisionError::invalid_price(raw, "no numeric value found"));
            }
            parse_finite(&scanned)
                .ok_or_else(|| ProvisionError::invalid_price(raw, "not a decimal number"))?
        }
    };

    if value <= 0.0 {
        return Err(ProvisionError::invalid_price(raw, "price must be greater than 0"));
    }

    let canonical = format!("{value:.3}");
    if canonical == "0.000" {
        return Err(ProvisionError::invalid_price(
            raw,
            "price rounds to zero at three decimal places",
        ));
    }
    Ok(canonical)
}

/// Normalize a price reported by the control plane, falling back to
/// [`DEFAULT_MIN_BID_PRICE`] when it is missing or unusable.
#[must_use]
pub fn normalize_or_default(raw: Option<&str>) -> String {
    raw.and_then(|price| normalize(price).ok())
        .unwrap_or_else(|| DEFAULT_MIN_BID_PRICE.to_string())
}

fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Keep digits and the first decimal point, dropping everything else.
fn scan_number(text: &str) -> String {
    let mut decimal_found = false;
    text.chars()
        .filter(|&c| {
            if c.is_ascii_digit() {
                true
            } else if c == '.' && !decimal_found {
                decimal_found = true;
                true
            } else {
                false
            }
        })
        .collect()
}
