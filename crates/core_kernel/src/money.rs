//! Money types with exact minor-unit arithmetic
//!
//! This module provides a type-safe representation of monetary values.
//! Amounts are stored as integer minor units (e.g., cents) so that every
//! sum and difference is exact; `rust_decimal` is used only at the edges,
//! where a rate or a major-unit figure is needed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Currency codes following ISO 4217
///
/// The set of supported currencies is closed: a string becomes a
/// `Currency` only through [`Currency::from_code`], never implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    CHF,
    INR,
    AUD,
    CAD,
    SGD,
    HKD,
}

impl Currency {
    /// Returns the number of decimal places for this currency
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::JPY => "¥",
            Currency::CHF => "CHF",
            Currency::INR => "₹",
            Currency::AUD => "A$",
            Currency::CAD => "C$",
            Currency::SGD => "S$",
            Currency::HKD => "HK$",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CHF => "CHF",
            Currency::INR => "INR",
            Currency::AUD => "AUD",
            Currency::CAD => "CAD",
            Currency::SGD => "SGD",
            Currency::HKD => "HKD",
        }
    }

    /// Parses an ISO 4217 code
    ///
    /// This is the only path from a string to a `Currency`, keeping
    /// arbitrary strings out of monetary arithmetic.
    pub fn from_code(code: &str) -> Result<Self, MoneyError> {
        match code.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "JPY" => Ok(Currency::JPY),
            "CHF" => Ok(Currency::CHF),
            "INR" => Ok(Currency::INR),
            "AUD" => Ok(Currency::AUD),
            "CAD" => Ok(Currency::CAD),
            "SGD" => Ok(Currency::SGD),
            "HKD" => Ok(Currency::HKD),
            other => Err(MoneyError::UnknownCurrency(other.to_string())),
        }
    }

    /// Returns the scale factor between minor and major units (10^dp)
    pub fn minor_per_major(&self) -> i64 {
        10_i64.pow(self.decimal_places())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s)
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount with associated currency
///
/// Amounts are integer minor units, so addition and subtraction are exact.
/// A `Money` value is immutable; the only way its currency changes is an
/// explicit FX conversion producing a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    minor: i64,
    currency: Currency,
}

impl Money {
    /// Creates Money from an integer amount in minor units (e.g., cents)
    pub fn from_minor(minor_units: i64, currency: Currency) -> Self {
        Self {
            minor: minor_units,
            currency,
        }
    }

    /// Creates Money from whole major units (e.g., dollars)
    pub fn from_major(major_units: i64, currency: Currency) -> Self {
        Self {
            minor: major_units * currency.minor_per_major(),
            currency,
        }
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self { minor: 0, currency }
    }

    /// Returns the amount in minor units
    pub fn minor_units(&self) -> i64 {
        self.minor
    }

    /// Returns the currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the amount in major units as a decimal
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.minor, self.currency.decimal_places())
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Returns true if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.minor > 0
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.minor < 0
    }

    /// Returns the absolute value
    pub fn abs(&self) -> Self {
        Self {
            minor: self.minor.abs(),
            currency: self.currency,
        }
    }

    /// Checked addition that fails on currency mismatch or overflow
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        let minor = self
            .minor
            .checked_add(other.minor)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self {
            minor,
            currency: self.currency,
        })
    }

    /// Checked subtraction that fails on currency mismatch or overflow
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        let minor = self
            .minor
            .checked_sub(other.minor)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self {
            minor,
            currency: self.currency,
        })
    }

    /// Sums an iterator of amounts into the given currency
    ///
    /// An empty iterator yields zero. Fails if any element carries a
    /// different currency.
    pub fn sum<'a, I>(amounts: I, currency: Currency) -> Result<Money, MoneyError>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        let mut total = Money::zero(currency);
        for amount in amounts {
            total = total.checked_add(amount)?;
        }
        Ok(total)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.decimal_places();
        write!(
            f,
            "{} {:.dp$}",
            self.currency.symbol(),
            self.to_decimal(),
            dp = dp as usize
        )
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        self.checked_add(&other)
            .expect("Currency mismatch in Money::add")
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        self.checked_sub(&other)
            .expect("Currency mismatch in Money::sub")
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            minor: -self.minor,
            currency: self.currency,
        }
    }
}

/// Represents a proportional rate (e.g., a tax rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.05 for 5%)
    value: Decimal,
}

impl Rate {
    /// Creates a rate from a decimal value (e.g., 0.05 for 5%)
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates a rate from a percentage (e.g., 5.0 for 5%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: percentage / Decimal::ONE_HUNDRED,
        }
    }

    /// Returns the rate as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.value * Decimal::ONE_HUNDRED
    }

    /// Returns true if the rate is exactly zero
    ///
    /// A configured zero rate is distinct from an unconfigured one.
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().round_dp(4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_from_minor() {
        let m = Money::from_minor(10050, Currency::USD);
        assert_eq!(m.minor_units(), 10050);
        assert_eq!(m.to_decimal(), dec!(100.50));
        assert_eq!(m.currency(), Currency::USD);
    }

    #[test]
    fn test_money_from_major() {
        assert_eq!(Money::from_major(12, Currency::USD).minor_units(), 1200);
        // JPY has no minor unit
        assert_eq!(Money::from_major(500, Currency::JPY).minor_units(), 500);
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::from_minor(10000, Currency::USD);
        let b = Money::from_minor(5000, Currency::USD);

        assert_eq!((a + b).minor_units(), 15000);
        assert_eq!((a - b).minor_units(), 5000);
        assert_eq!((-a).minor_units(), -10000);
    }

    #[test]
    fn test_currency_mismatch() {
        let usd = Money::from_minor(10000, Currency::USD);
        let eur = Money::from_minor(10000, Currency::EUR);

        let result = usd.checked_add(&eur);
        assert!(matches!(result, Err(MoneyError::CurrencyMismatch(_, _))));
    }

    #[test]
    fn test_overflow_detected() {
        let a = Money::from_minor(i64::MAX, Currency::USD);
        let b = Money::from_minor(1, Currency::USD);
        assert_eq!(a.checked_add(&b), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_money_sum() {
        let amounts = vec![
            Money::from_minor(100, Currency::USD),
            Money::from_minor(250, Currency::USD),
        ];
        let total = Money::sum(&amounts, Currency::USD).unwrap();
        assert_eq!(total.minor_units(), 350);

        let empty: Vec<Money> = vec![];
        assert_eq!(Money::sum(&empty, Currency::USD).unwrap().minor_units(), 0);
    }

    #[test]
    fn test_currency_parse() {
        assert_eq!(Currency::from_code("usd").unwrap(), Currency::USD);
        assert_eq!(Currency::from_code(" EUR ").unwrap(), Currency::EUR);
        assert!(matches!(
            Currency::from_code("ZZZ"),
            Err(MoneyError::UnknownCurrency(_))
        ));
        assert_eq!("GBP".parse::<Currency>().unwrap(), Currency::GBP);
    }

    #[test]
    fn test_money_display() {
        let m = Money::from_minor(55000, Currency::USD);
        assert_eq!(m.to_string(), "$ 550.00");
        let y = Money::from_minor(10000, Currency::JPY);
        assert_eq!(y.to_string(), "¥ 10000");
    }

    #[test]
    fn test_rate() {
        let rate = Rate::from_percentage(dec!(8.25));
        assert_eq!(rate.as_decimal(), dec!(0.0825));
        assert!(!rate.is_zero());
        assert!(Rate::new(dec!(0)).is_zero());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn money_addition_is_associative(
            a in -1_000_000i64..1_000_000i64,
            b in -1_000_000i64..1_000_000i64,
            c in -1_000_000i64..1_000_000i64
        ) {
            let ma = Money::from_minor(a, Currency::USD);
            let mb = Money::from_minor(b, Currency::USD);
            let mc = Money::from_minor(c, Currency::USD);

            prop_assert_eq!((ma + mb) + mc, ma + (mb + mc));
        }

        #[test]
        fn money_sub_is_inverse_of_add(
            a in -1_000_000i64..1_000_000i64,
            b in -1_000_000i64..1_000_000i64
        ) {
            let ma = Money::from_minor(a, Currency::USD);
            let mb = Money::from_minor(b, Currency::USD);

            prop_assert_eq!((ma + mb) - mb, ma);
        }

        #[test]
        fn zero_is_additive_identity(minor in -10_000_000i64..10_000_000i64) {
            let m = Money::from_minor(minor, Currency::USD);
            prop_assert_eq!(m + Money::zero(Currency::USD), m);
        }
    }
}
