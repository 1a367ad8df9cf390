//! Invoice billing events
//!
//! Invoices are owned by the billing system of record; this engine only
//! reads them. An invoice carries the line items that drive ratable
//! revenue recognition and the jurisdiction that drives tax aggregation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Currency, DateRange, FxConverter, FxError, InvoiceId, Money};

/// Invoice lifecycle status
///
/// Transitions are monotonic: an invoice never moves back toward Draft,
/// and Paid, Void, and Uncollectible are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Invoice is being drafted
    Draft,
    /// Invoice has been issued and awaits payment
    Open,
    /// Fully paid
    Paid,
    /// Payment failed for good; treated as a dispute
    Uncollectible,
    /// Cancelled; recognition is frozen at the void date
    Void,
}

impl InvoiceStatus {
    /// Returns true if no further transitions are allowed
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            InvoiceStatus::Paid | InvoiceStatus::Void | InvoiceStatus::Uncollectible
        )
    }

    /// Returns true if `next` is a legal lifecycle transition
    pub fn can_transition_to(&self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, next),
            (Draft, Open) | (Draft, Void) | (Open, Paid) | (Open, Uncollectible) | (Open, Void)
        )
    }
}

/// How a line item's amount is earned over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionPolicy {
    /// Straight-line over the service period, day by day
    Ratable,
    /// Fully earned on the first day of the service period
    Immediate,
}

/// Tax authority scope for an invoice (e.g., a country or region code)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Jurisdiction(String);

impl Jurisdiction {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category label used by tax exemption configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxCategory(String);

impl TaxCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaxCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A line item on an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Billed amount for this item
    pub amount: Money,
    /// Service period the amount covers; a single-day period is a
    /// point-in-time charge
    pub period: DateRange,
    /// Recognition policy for this item
    pub policy: RecognitionPolicy,
    /// Optional category for tax exemption matching
    pub tax_category: Option<TaxCategory>,
}

impl LineItem {
    pub fn new(amount: Money, period: DateRange, policy: RecognitionPolicy) -> Self {
        Self {
            amount,
            period,
            policy,
            tax_category: None,
        }
    }

    pub fn with_tax_category(mut self, category: TaxCategory) -> Self {
        self.tax_category = Some(category);
        self
    }
}

/// An invoice billing event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// When the invoice was issued; FX conversions of invoice amounts use
    /// this instant
    pub issued_at: DateTime<Utc>,
    /// When the invoice was paid, if it has been
    pub paid_at: Option<DateTime<Utc>>,
    /// When the invoice was voided; recognition freezes at this instant
    pub voided_at: Option<DateTime<Utc>>,
    /// Total billed amount
    pub total: Money,
    /// Lifecycle status
    pub status: InvoiceStatus,
    /// Line items driving recognition and tax
    pub line_items: Vec<LineItem>,
    /// Tax jurisdiction
    pub jurisdiction: Jurisdiction,
}

impl Invoice {
    pub fn is_paid(&self) -> bool {
        self.status == InvoiceStatus::Paid
    }

    pub fn is_void(&self) -> bool {
        self.status == InvoiceStatus::Void
    }

    /// Returns a copy with every monetary field converted to the
    /// reporting currency, using `issued_at` as the rate instant
    pub fn normalized(
        &self,
        fx: &FxConverter,
        reporting: Currency,
    ) -> Result<Invoice, FxError> {
        let mut converted = self.clone();
        converted.total = fx.convert(self.total, reporting, self.issued_at)?;
        for item in &mut converted.line_items {
            item.amount = fx.convert(item.amount, reporting, self.issued_at)?;
        }
        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use core_kernel::FxRate;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> chrono::NaiveDate {
        chrono::NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_status_transitions_monotonic() {
        use InvoiceStatus::*;
        assert!(Draft.can_transition_to(Open));
        assert!(Open.can_transition_to(Paid));
        assert!(Open.can_transition_to(Uncollectible));
        assert!(!Paid.can_transition_to(Open));
        assert!(!Void.can_transition_to(Open));
        assert!(!Uncollectible.can_transition_to(Paid));
        assert!(Paid.is_terminal());
        assert!(Uncollectible.is_terminal());
    }

    #[test]
    fn test_jurisdiction_normalizes() {
        let j = Jurisdiction::new(" de ");
        assert_eq!(j.as_str(), "DE");
    }

    #[test]
    fn test_invoice_normalized_uses_issued_at() {
        let issued = Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap();
        let fx = FxConverter::new().with_rate(FxRate {
            from: Currency::EUR,
            to: Currency::USD,
            rate: dec!(1.10),
            as_of: issued,
        });

        let invoice = Invoice {
            id: InvoiceId::new(),
            issued_at: issued,
            paid_at: None,
            voided_at: None,
            total: Money::from_minor(50000, Currency::EUR),
            status: InvoiceStatus::Open,
            line_items: vec![LineItem::new(
                Money::from_minor(50000, Currency::EUR),
                DateRange::new(day(1), day(31)).unwrap(),
                RecognitionPolicy::Ratable,
            )],
            jurisdiction: Jurisdiction::new("DE"),
        };

        let converted = invoice.normalized(&fx, Currency::USD).unwrap();
        assert_eq!(converted.total, Money::from_minor(55000, Currency::USD));
        assert_eq!(
            converted.line_items[0].amount,
            Money::from_minor(55000, Currency::USD)
        );
        // non-monetary fields untouched
        assert_eq!(converted.id, invoice.id);
        assert_eq!(converted.status, invoice.status);
    }
}
