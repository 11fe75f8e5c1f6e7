//! # Money Module
//!
//! Numeric guards for engine arithmetic and the `Money` type used when
//! figures are shown to people.
//!
//! ## Two Kinds of Number
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ENGINE VALUES (f64)                                                    │
//! │    Quantities (0.25 kg flour), unit costs, COGS, tax amounts.           │
//! │    Never rounded inside the engine. Every division goes through         │
//! │    safe_div, every result through finite_or_zero:                       │
//! │                                                                         │
//! │      10.0 / 0.0   = inf   ──► 0.0                                       │
//! │       0.0 / 0.0   = NaN   ──► 0.0                                       │
//! │                                                                         │
//! │  DISPLAY VALUES (Money, i64 minor units)                                │
//! │    Built from an engine value at the very edge, for receipts and        │
//! │    report screens:                                                      │
//! │                                                                         │
//! │      1177.4  ──► 117740 cents  ──► "$1177.40" / "KSh 1177.40"         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use larder_core::money::{safe_div, Money};
//!
//! assert_eq!(safe_div(10.0, 0.0), 0.0);
//! assert_eq!(Money::from_amount(12.345).to_string(), "$12.35");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Non-finite Guards
// =============================================================================

/// Coerces NaN and ±Infinity to zero.
///
/// A single bad upstream record (a lot with a zero quantity that somebody
/// divided by) must not poison an otherwise valid report.
#[inline]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Divides, returning zero when the denominator is zero or the quotient is
/// not finite.
///
/// ## Example
/// ```rust
/// use larder_core::money::safe_div;
///
/// assert_eq!(safe_div(30.0, 4.0), 7.5);
/// assert_eq!(safe_div(30.0, 0.0), 0.0);
/// assert_eq!(safe_div(f64::NAN, 2.0), 0.0);
/// ```
#[inline]
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    finite_or_zero(numerator / denominator)
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the currency's minor unit, with the number of decimal
/// places that unit represents (cents: 2, yen: 0).
///
/// ## Design Decisions
/// - **i64 (signed)**: variance losses and negative gross profit are real
/// - **Display only**: the engine computes in `f64`; `Money` is built at the
///   presentation edge so rounding never feeds back into totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    minor_units: i64,
    decimals: u8,
}

impl Money {
    /// Largest supported number of decimal places.
    pub const MAX_DECIMALS: u8 = 4;

    /// Creates a two-decimal Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money {
            minor_units: cents,
            decimals: 2,
        }
    }

    /// Rounds an engine amount to the nearest cent.
    ///
    /// ## Example
    /// ```rust
    /// use larder_core::money::Money;
    ///
    /// assert_eq!(Money::from_amount(162.4).minor_units(), 16240);
    /// assert_eq!(Money::from_amount(-0.125).minor_units(), -13);
    /// assert_eq!(Money::from_amount(f64::INFINITY).minor_units(), 0);
    /// ```
    pub fn from_amount(amount: f64) -> Self {
        Self::from_amount_in(amount, 2)
    }

    /// Rounds an engine amount to `decimals` places (capped at
    /// [`Money::MAX_DECIMALS`]).
    ///
    /// Halves round away from zero (`f64::round`). Non-finite amounts become
    /// zero.
    pub fn from_amount_in(amount: f64, decimals: u8) -> Self {
        let decimals = decimals.min(Self::MAX_DECIMALS);
        let scale = 10_f64.powi(i32::from(decimals));
        let minor_units = finite_or_zero(amount * scale).round();
        Money {
            minor_units: minor_units as i64,
            decimals,
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor_units(&self) -> i64 {
        self.minor_units
    }

    /// Returns the number of decimal places.
    #[inline]
    pub const fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.minor_units < 0
    }

    /// Formats with a currency symbol; the sign goes before the symbol.
    ///
    /// ## Example
    /// ```rust
    /// use larder_core::money::Money;
    ///
    /// assert_eq!(Money::from_amount_in(-0.5, 2).with_symbol("KSh "), "-KSh 0.50");
    /// assert_eq!(Money::from_amount_in(1234.4, 0).with_symbol("¥"), "¥1234");
    /// ```
    pub fn with_symbol(&self, symbol: &str) -> String {
        let divisor = 10_i64.pow(u32::from(self.decimals));
        let whole = (self.minor_units / divisor).abs();
        let fraction = (self.minor_units % divisor).abs();
        let sign = if self.is_negative() { "-" } else { "" };

        if self.decimals == 0 {
            format!("{}{}{}", sign, symbol, whole)
        } else {
            format!(
                "{}{}{}.{:0width$}",
                sign,
                symbol,
                whole,
                fraction,
                width = usize::from(self.decimals)
            )
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$12.34`.
///
/// ## Note
/// Currency symbols and decimals per company live in the config layer;
/// this is the debugging / default rendering.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.with_symbol("$"))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::from_cents(0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_or_zero() {
        assert_eq!(finite_or_zero(12.5), 12.5);
        assert_eq!(finite_or_zero(-3.0), -3.0);
        assert_eq!(finite_or_zero(f64::NAN), 0.0);
        assert_eq!(finite_or_zero(f64::INFINITY), 0.0);
        assert_eq!(finite_or_zero(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(9.0, 3.0), 3.0);
        assert_eq!(safe_div(9.0, 0.0), 0.0);
        assert_eq!(safe_div(0.0, 0.0), 0.0);
        assert_eq!(safe_div(9.0, -0.0), 0.0);
        assert_eq!(safe_div(f64::MAX, f64::MIN_POSITIVE), 0.0);
    }

    #[test]
    fn test_from_amount_rounding() {
        assert_eq!(Money::from_amount(10.994).minor_units(), 1099);
        assert_eq!(Money::from_amount(10.995).minor_units(), 1100);
        assert_eq!(Money::from_amount(-5.5).minor_units(), -550);
        assert_eq!(Money::from_amount(f64::NAN).minor_units(), 0);
    }

    #[test]
    fn test_from_amount_in_scales() {
        assert_eq!(Money::from_amount_in(1234.4, 0).minor_units(), 1234);
        assert_eq!(Money::from_amount_in(1.23456, 3).minor_units(), 1235);
        assert_eq!(Money::from_amount_in(1.0, 9).decimals(), Money::MAX_DECIMALS);
        assert_eq!(Money::from_amount_in(1.0, 9).minor_units(), 10_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(-5)), "-$0.05");
        assert_eq!(format!("{}", Money::default()), "$0.00");
    }

    #[test]
    fn test_with_symbol() {
        assert_eq!(Money::from_amount_in(1177.4, 2).with_symbol("KSh "), "KSh 1177.40");
        assert_eq!(Money::from_amount_in(0.5, 4).with_symbol("€"), "€0.5000");
        assert_eq!(Money::from_amount_in(-3.0, 0).with_symbol("¥"), "-¥3");
        assert!(!Money::from_cents(1).is_negative());
    }
}
