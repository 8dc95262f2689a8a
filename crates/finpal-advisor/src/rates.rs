//! Exchange Rates
//!
//! Simplified static rate table for currency conversion. Only direct pairs
//! convert; there is no inverse-rate fallback and no multi-hop routing.

use crate::error::{AdvisorError, Result};

/// Static rate for a direct "SOURCE_TARGET" pair
fn direct_rate(pair: &str) -> Option<f64> {
    match pair {
        "USD_INR" => Some(83.5),
        "INR_USD" => Some(1.0 / 83.5),
        "EUR_USD" => Some(1.08),
        "USD_EUR" => Some(1.0 / 1.08),
        "GBP_USD" => Some(1.27),
        "USD_GBP" => Some(1.0 / 1.27),
        _ => None,
    }
}

/// Convert an amount between currencies using the static table.
///
/// Codes are case-insensitive. Fails when the ordered pair is not
/// tabulated.
pub fn convert(amount: f64, from_currency: &str, to_currency: &str) -> Result<f64> {
    let from = from_currency.to_uppercase();
    let to = to_currency.to_uppercase();

    let rate = direct_rate(&format!("{}_{}", from, to))
        .ok_or(AdvisorError::RateUnavailable { from, to })?;

    Ok(amount * rate)
}
