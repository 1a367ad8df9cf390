//! Refund billing events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, FxConverter, FxError, Money, PaymentId, RefundId};

/// Refund status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Succeeded,
    Pending,
    Failed,
}

/// A refund billing event
///
/// The upstream system of record guarantees a refund never exceeds the
/// remaining refundable balance of its originating payment; this engine
/// assumes that invariant holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Refund {
    /// Unique identifier
    pub id: RefundId,
    /// The payment being refunded
    pub payment_id: PaymentId,
    /// Refunded amount
    pub amount: Money,
    /// When the refund was processed; FX conversions use this instant,
    /// and recognition reductions apply prospectively from this date
    pub processed_at: DateTime<Utc>,
    /// Processing status
    pub status: RefundStatus,
}

impl Refund {
    pub fn is_succeeded(&self) -> bool {
        self.status == RefundStatus::Succeeded
    }

    /// Returns a copy with the amount converted to the reporting
    /// currency, using `processed_at` as the rate instant
    pub fn normalized(&self, fx: &FxConverter, reporting: Currency) -> Result<Refund, FxError> {
        let mut converted = self.clone();
        converted.amount = fx.convert(self.amount, reporting, self.processed_at)?;
        Ok(converted)
    }
}
