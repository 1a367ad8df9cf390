//! Foreign exchange conversion
//!
//! Converts a [`Money`] value from its native currency to a reporting
//! currency using a rate valid at a specific instant. The converter is
//! immutable once built: callers that refresh rates swap the whole
//! converter (e.g., behind an `Arc`), so every individual `convert` call
//! observes a consistent rate table.
//!
//! Rounding policy: conversion goes through major units and applies
//! banker's rounding (round half to even) exactly once, at the point of
//! conversion. Same-currency conversion is a no-op with no rounding.
//!
//! Round-trip conversion A→B→A is not guaranteed to be the identity:
//! rates drift and each direction carries its own rate. What is
//! guaranteed is determinism: the same (amount, currency, instant) always
//! converts to the same result.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::money::{Currency, Money, MoneyError};

/// Errors that can occur during FX conversion
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FxError {
    #[error("No {from}->{to} rate available as of {as_of} within staleness tolerance")]
    RateUnavailable {
        from: Currency,
        to: Currency,
        as_of: DateTime<Utc>,
    },

    #[error("Converted amount out of range")]
    Overflow,

    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A single exchange rate observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FxRate {
    pub from: Currency,
    pub to: Currency,
    /// Major units of `to` per major unit of `from`
    pub rate: Decimal,
    /// When this rate was observed
    pub as_of: DateTime<Utc>,
}

/// Converts monetary values between currencies using timestamped rates
///
/// Rates are stored per currency pair, sorted by observation time. A
/// lookup finds the most recent rate at or before the requested instant,
/// subject to the staleness tolerance.
#[derive(Debug, Clone)]
pub struct FxConverter {
    rates: HashMap<(Currency, Currency), Vec<FxRate>>,
    staleness: Duration,
}

impl FxConverter {
    /// Default staleness tolerance: a rate older than this before the
    /// requested instant is not used.
    pub const DEFAULT_STALENESS_HOURS: i64 = 24;

    pub fn new() -> Self {
        Self {
            rates: HashMap::new(),
            staleness: Duration::hours(Self::DEFAULT_STALENESS_HOURS),
        }
    }

    /// Overrides the staleness tolerance
    pub fn with_staleness(mut self, staleness: Duration) -> Self {
        self.staleness = staleness;
        self
    }

    /// Adds a rate observation, keeping the pair's history time-ordered
    pub fn with_rate(mut self, rate: FxRate) -> Self {
        let entry = self.rates.entry((rate.from, rate.to)).or_default();
        let pos = entry.partition_point(|r| r.as_of <= rate.as_of);
        entry.insert(pos, rate);
        self
    }

    /// Converts `money` to `to_currency` using the rate valid at `as_of`
    ///
    /// Returns the input unchanged when the currencies already match.
    /// Fails with [`FxError::RateUnavailable`] when the most recent rate
    /// at or before `as_of` is older than the staleness tolerance, or no
    /// rate exists for the pair at all.
    pub fn convert(
        &self,
        money: Money,
        to_currency: Currency,
        as_of: DateTime<Utc>,
    ) -> Result<Money, FxError> {
        if money.currency() == to_currency {
            return Ok(money);
        }

        let rate = self.lookup(money.currency(), to_currency, as_of)?;

        // Cross the minor-unit scale boundary (e.g., EUR cents -> JPY yen)
        // through major units; one banker's rounding at the end.
        let converted_major = money.to_decimal() * rate.rate;
        let minor = (converted_major * Decimal::from(to_currency.minor_per_major()))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);

        let minor = minor.to_i64().ok_or(FxError::Overflow)?;
        Ok(Money::from_minor(minor, to_currency))
    }

    fn lookup(
        &self,
        from: Currency,
        to: Currency,
        as_of: DateTime<Utc>,
    ) -> Result<&FxRate, FxError> {
        let unavailable = || FxError::RateUnavailable { from, to, as_of };

        let history = self.rates.get(&(from, to)).ok_or_else(unavailable)?;
        let idx = history.partition_point(|r| r.as_of <= as_of);
        let rate = history[..idx].last().ok_or_else(unavailable)?;

        if as_of - rate.as_of > self.staleness {
            return Err(unavailable());
        }
        Ok(rate)
    }
}

impl Default for FxConverter {
    fn default() -> Self {
        Self::new()
    }
}
