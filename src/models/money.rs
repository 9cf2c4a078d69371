//! Money type for representing YNAB amounts
//!
//! The YNAB API reports every amount as an integer number of *milliunits*
//! (one thousandth of the currency unit). Amounts are kept as i64 milliunits
//! so sums and differences stay exact; conversion for display goes through
//! `rust_decimal` rather than a float division.

use rust_decimal::prelude::{RoundingStrategy, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

/// Number of milliunits in one currency unit
pub const MILLIUNITS_PER_UNIT: i64 = 1000;

/// A monetary amount in YNAB milliunits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Milliunits(i64);

impl Milliunits {
    /// Create an amount from raw milliunits
    ///
    /// # Examples
    /// ```
    /// use ynab_sensors::models::Milliunits;
    /// let amount = Milliunits::new(50_000); // 50.00
    /// ```
    pub const fn new(milliunits: i64) -> Self {
        Self(milliunits)
    }

    /// Create a zero amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the raw milliunit value
    pub const fn raw(&self) -> i64 {
        self.0
    }

    /// Check if the amount is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the amount is positive
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Check if the amount is negative
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Exact decimal value in currency units (e.g. 50000 -> 50)
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 3).normalize()
    }

    /// Amount for a decimal value in currency units, rounded to whole
    /// milliunits; `None` if it does not fit
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        let milliunits = value.checked_mul(Decimal::from(MILLIUNITS_PER_UNIT))?;
        milliunits
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(Self)
    }

    /// Format for display with a currency symbol and a fixed number of
    /// fraction digits. Rounds half away from zero on the display only.
    pub fn format_with(&self, symbol: &str, fraction_digits: u32) -> String {
        let value = Decimal::new(self.0, 3)
            .round_dp_with_strategy(fraction_digits, RoundingStrategy::MidpointAwayFromZero);
        let magnitude = value.abs();
        let mut digits = magnitude.to_string();
        if fraction_digits > 0 {
            let scale = magnitude.scale();
            if scale < fraction_digits {
                if scale == 0 {
                    digits.push('.');
                }
                for _ in scale..fraction_digits {
                    digits.push('0');
                }
            }
        }
        if value.is_sign_negative() && !value.is_zero() {
            format!("-{}{}", symbol, digits)
        } else {
            format!("{}{}", symbol, digits)
        }
    }
}

/// Display symbol for an ISO currency code; unknown codes fall back to `$`
pub fn currency_symbol(code: &str) -> &'static str {
    match code.to_ascii_uppercase().as_str() {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "AUD" => "A$",
        "CAD" => "C$",
        "JPY" => "¥",
        "CHF" => "CHF",
        "SEK" => "kr",
        "NZD" => "NZ$",
        _ => "$",
    }
}

/// Number of fraction digits shown for a currency
pub fn currency_fraction_digits(code: &str) -> u32 {
    match code.to_ascii_uppercase().as_str() {
        "JPY" => 0,
        _ => 2,
    }
}

/// Currency codes offered during setup
pub const SUPPORTED_CURRENCIES: &[&str] = &[
    "USD", "EUR", "GBP", "AUD", "CAD", "JPY", "CHF", "SEK", "NZD",
];

impl Default for Milliunits {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Milliunits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with("$", 2))
    }
}

impl From<i64> for Milliunits {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Add for Milliunits {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Milliunits {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Milliunits {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl Neg for Milliunits {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl std::iter::Sum for Milliunits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Milliunits::zero(), |acc, m| acc + m)
    }
}
