//! `f64` conversion at the broker wire boundary.
//!
//! # Design invariant
//!
//! Every price on the enforcement surface is a `Micros` (fixed-point, 1e-6
//! scale — §3A). `f64` conversions happen **only** here, at the two points
//! where a broker SDK actually requires or returns a floating-point number:
//!
//! | Direction                  | Function            | Notes                   |
//! |-----------------------------|---------------------|--------------------------|
//! | internal → broker SDK call  | [`micros_to_price`]  | Serialization only       |
//! | broker SDK response → internal | [`price_to_micros`] | Parsing / ingestion only |
//!
//! No other code path in this crate should produce or consume `f64` prices.

use riskd_schemas::money::Micros;

/// Errors returned by [`price_to_micros`] when the broker's price is not
/// representable as `Micros`.
///
/// Both variants fire in all build profiles — there is no `debug_assert!`
/// escape hatch here, since a bad broker price must never silently become a
/// bad `Micros` value feeding P&L math.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Input was `NaN` or infinite.
    NotFinite,
    /// Input would overflow `i64` after scaling to micros.
    OutOfRange,
}

impl std::fmt::Display for PricingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PricingError::NotFinite => write!(f, "price_to_micros: non-finite input (NaN or Inf)"),
            PricingError::OutOfRange => write!(f, "price_to_micros: price out of i64 range after scaling"),
        }
    }
}

impl std::error::Error for PricingError {}

/// Convert a `Micros` price to `f64` for broker SDK serialization.
///
/// **Only call at the broker wire boundary.** Internal prices stay `Micros`.
pub fn micros_to_price(micros: Micros) -> f64 {
    micros.raw() as f64 / 1_000_000.0
}

/// Convert an `f64` price from a broker SDK response into `Micros`.
///
/// Rounds to the nearest micro to avoid systematic truncation bias.
///
/// # Errors
/// [`PricingError::NotFinite`] if `price` is `NaN` or infinite.
/// [`PricingError::OutOfRange`] if `price * 1_000_000` would overflow `i64`.
pub fn price_to_micros(price: f64) -> Result<Micros, PricingError> {
    if !price.is_finite() {
        return Err(PricingError::NotFinite);
    }
    let scaled = price * 1_000_000.0;
    if scaled > i64::MAX as f64 || scaled < i64::MIN as f64 {
        return Err(PricingError::OutOfRange);
    }
    Ok(Micros::new(scaled.round() as i64))
}
