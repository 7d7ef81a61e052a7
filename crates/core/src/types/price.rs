//! Exact decimal prices parsed from currency-formatted strings.
//!
//! The content store delivers prices as display strings (e.g. `"$1,299.00"`).
//! Cart totals are computed from those strings, so parsing must be exact -
//! no floats, no locale guessing. `Decimal` keeps the arithmetic lossless.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing a currency-formatted price string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceParseError {
    /// The string was empty (or whitespace) after stripping formatting.
    #[error("empty price string")]
    Empty,
    /// The string did not parse as a decimal amount.
    #[error("invalid price string: {0:?}")]
    Invalid(String),
}

/// A price in US dollars with an exact decimal amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from an exact decimal amount.
    #[must_use]
    pub const fn from_amount(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Parse a currency-formatted string such as `"$1,299.00"`.
    ///
    /// Only the `$` currency symbol and `,` thousands separators are
    /// stripped; everything else must be a plain decimal number. This is
    /// deliberately strict - the parsed value feeds displayed cart totals.
    ///
    /// # Errors
    ///
    /// Returns [`PriceParseError`] if the string is empty or not a valid
    /// decimal amount after stripping formatting characters.
    pub fn parse(raw: &str) -> Result<Self, PriceParseError> {
        let cleaned: String = raw
            .trim()
            .chars()
            .filter(|c| *c != '$' && *c != ',')
            .collect();

        if cleaned.is_empty() {
            return Err(PriceParseError::Empty);
        }

        Decimal::from_str(&cleaned)
            .map(Self)
            .map_err(|_| PriceParseError::Invalid(raw.to_string()))
    }

    /// The exact decimal amount in dollars.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    /// Formats as a US dollar display string, e.g. `$1,299.00`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_usd(self.0))
    }
}

/// Format a decimal dollar amount as `$1,234.56`.
///
/// Rounds to two decimal places and inserts `,` thousands separators.
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let negative = rounded.is_sign_negative();
    let abs = rounded.abs();

    // "1234.56" -> integer and fraction halves
    let plain = format!("{abs:.2}");
    let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i).is_multiple_of(3) {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}${grouped}.{frac_part}")
}

impl FromStr for Price {
    type Err = PriceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
