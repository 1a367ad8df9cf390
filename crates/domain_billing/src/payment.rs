//! Payment billing events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, FxConverter, FxError, InvoiceId, Money, PaymentId};

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Succeeded,
    Failed,
    Pending,
}

/// A payment billing event
///
/// Owned by the billing system of record; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Invoice the payment settles, when known
    pub invoice_id: Option<InvoiceId>,
    /// Payment amount
    pub amount: Money,
    /// When the payment was processed; FX conversions use this instant
    pub processed_at: DateTime<Utc>,
    /// Processing status
    pub status: PaymentStatus,
}

impl Payment {
    pub fn is_succeeded(&self) -> bool {
        self.status == PaymentStatus::Succeeded
    }

    /// Returns a copy with the amount converted to the reporting
    /// currency, using `processed_at` as the rate instant
    pub fn normalized(
        &self,
        fx: &FxConverter,
        reporting: Currency,
    ) -> Result<Payment, FxError> {
        let mut converted = self.clone();
        converted.amount = fx.convert(self.amount, reporting, self.processed_at)?;
        Ok(converted)
    }
}
