//! Subscription billing events and cadence normalization
//!
//! Subscriptions feed only the MRR/ARR metrics; recognition is driven by
//! invoice line items, never by subscriptions. The engine treats each
//! subscription as a point-in-time snapshot.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use core_kernel::{Currency, FxConverter, FxError, Money, SubscriptionId};

use crate::error::BillingError;

/// Subscription status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Paused,
    Cancelled,
}

/// Billing cadence of a subscription
///
/// The cadence-to-monthly normalization table is explicit and total:
/// every variant has a defined number of billing periods per year, and a
/// string that names no variant is a configuration error, never a silent
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCadence {
    Weekly,
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
    Biennial,
}

impl BillingCadence {
    /// Billing periods per year for this cadence
    pub fn periods_per_year(&self) -> Decimal {
        match self {
            BillingCadence::Weekly => dec!(52),
            BillingCadence::Monthly => dec!(12),
            BillingCadence::Quarterly => dec!(4),
            BillingCadence::SemiAnnual => dec!(2),
            BillingCadence::Annual => dec!(1),
            BillingCadence::Biennial => dec!(0.5),
        }
    }
}

impl FromStr for BillingCadence {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(BillingCadence::Weekly),
            "monthly" => Ok(BillingCadence::Monthly),
            "quarterly" => Ok(BillingCadence::Quarterly),
            "semi_annual" | "semiannual" => Ok(BillingCadence::SemiAnnual),
            "annual" | "yearly" => Ok(BillingCadence::Annual),
            "biennial" => Ok(BillingCadence::Biennial),
            other => Err(BillingError::UnknownCadence(other.to_string())),
        }
    }
}

/// A subscription billing event snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique identifier
    pub id: SubscriptionId,
    /// Current status
    pub status: SubscriptionStatus,
    /// Price charged per billing period
    pub price_per_period: Money,
    /// Billing cadence
    pub cadence: BillingCadence,
    /// When the subscription started
    pub started_at: DateTime<Utc>,
    /// When the subscription ended, if it has
    pub ended_at: Option<DateTime<Utc>>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }

    /// Monthly-normalized revenue contribution of this subscription
    ///
    /// `price_per_period × periods_per_year / 12`, banker's-rounded once
    /// to minor units. An annual $1200 subscription contributes $100.00.
    pub fn monthly_amount(&self) -> Result<Money, BillingError> {
        let monthly = Decimal::from(self.price_per_period.minor_units())
            * self.cadence.periods_per_year()
            / dec!(12);
        let minor = monthly
            .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
            .to_i64()
            .ok_or(BillingError::AmountOutOfRange)?;
        Ok(Money::from_minor(minor, self.price_per_period.currency()))
    }

    /// Returns a copy with the price converted to the reporting currency
    ///
    /// Subscriptions are evaluated as of `now` for MRR purposes, so the
    /// caller supplies the rate instant.
    pub fn normalized(
        &self,
        fx: &FxConverter,
        reporting: Currency,
        as_of: DateTime<Utc>,
    ) -> Result<Subscription, FxError> {
        let mut converted = self.clone();
        converted.price_per_period = fx.convert(self.price_per_period, reporting, as_of)?;
        Ok(converted)
    }
}
