//! Test Data Builders
//!
//! Builder patterns for constructing billing events with sensible
//! defaults, so tests specify only the fields they care about.

use chrono::{DateTime, TimeZone, Utc};

use core_kernel::{Currency, DateRange, InvoiceId, Money, PaymentId, RefundId, SubscriptionId};
use domain_billing::{
    BillingCadence, Invoice, InvoiceStatus, Jurisdiction, LineItem, Payment, PaymentStatus,
    Refund, RefundStatus, Subscription, SubscriptionStatus,
};

use crate::fixtures::TemporalFixtures;

/// Builder for test invoices
///
/// Defaults: open status, issued at the fixture epoch, US jurisdiction,
/// and a total equal to the sum of the line items unless overridden.
pub struct InvoiceBuilder {
    id: InvoiceId,
    issued_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
    voided_at: Option<DateTime<Utc>>,
    total: Option<Money>,
    status: InvoiceStatus,
    line_items: Vec<LineItem>,
    jurisdiction: Jurisdiction,
}

impl Default for InvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceBuilder {
    pub fn new() -> Self {
        Self {
            id: InvoiceId::new(),
            issued_at: TemporalFixtures::epoch(),
            paid_at: None,
            voided_at: None,
            total: None,
            status: InvoiceStatus::Open,
            line_items: Vec::new(),
            jurisdiction: Jurisdiction::new("US"),
        }
    }

    pub fn with_id(mut self, id: InvoiceId) -> Self {
        self.id = id;
        self
    }

    pub fn issued_at(mut self, at: DateTime<Utc>) -> Self {
        self.issued_at = at;
        self
    }

    /// Marks the invoice paid at the given instant
    pub fn paid(mut self, at: DateTime<Utc>) -> Self {
        self.status = InvoiceStatus::Paid;
        self.paid_at = Some(at);
        self
    }

    /// Marks the invoice voided at the given instant
    pub fn voided(mut self, at: DateTime<Utc>) -> Self {
        self.status = InvoiceStatus::Void;
        self.voided_at = Some(at);
        self
    }

    pub fn with_status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_total(mut self, total: Money) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_line_item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        self
    }

    pub fn with_jurisdiction(mut self, jurisdiction: Jurisdiction) -> Self {
        self.jurisdiction = jurisdiction;
        self
    }

    pub fn build(self) -> Invoice {
        let total = self.total.unwrap_or_else(|| {
            let currency = self
                .line_items
                .first()
                .map(|item| item.amount.currency())
                .unwrap_or(Currency::USD);
            self.line_items
                .iter()
                .fold(Money::zero(currency), |acc, item| acc + item.amount)
        });

        Invoice {
            id: self.id,
            issued_at: self.issued_at,
            paid_at: self.paid_at,
            voided_at: self.voided_at,
            total,
            status: self.status,
            line_items: self.line_items,
            jurisdiction: self.jurisdiction,
        }
    }
}

/// Builder for test payments
pub struct PaymentBuilder {
    id: PaymentId,
    invoice_id: Option<InvoiceId>,
    amount: Money,
    processed_at: DateTime<Utc>,
    status: PaymentStatus,
}

impl Default for PaymentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentBuilder {
    pub fn new() -> Self {
        Self {
            id: PaymentId::new(),
            invoice_id: None,
            amount: Money::from_minor(10_000, Currency::USD),
            processed_at: TemporalFixtures::epoch(),
            status: PaymentStatus::Succeeded,
        }
    }

    pub fn with_invoice_id(mut self, invoice_id: InvoiceId) -> Self {
        self.invoice_id = Some(invoice_id);
        self
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn processed_at(mut self, at: DateTime<Utc>) -> Self {
        self.processed_at = at;
        self
    }

    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> Payment {
        Payment {
            id: self.id,
            invoice_id: self.invoice_id,
            amount: self.amount,
            processed_at: self.processed_at,
            status: self.status,
        }
    }
}

/// Builder for test refunds
pub struct RefundBuilder {
    id: RefundId,
    payment_id: PaymentId,
    amount: Money,
    processed_at: DateTime<Utc>,
    status: RefundStatus,
}

impl Default for RefundBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RefundBuilder {
    pub fn new() -> Self {
        Self {
            id: RefundId::new(),
            payment_id: PaymentId::new(),
            amount: Money::from_minor(5_000, Currency::USD),
            processed_at: TemporalFixtures::epoch(),
            status: RefundStatus::Succeeded,
        }
    }

    pub fn with_payment_id(mut self, payment_id: PaymentId) -> Self {
        self.payment_id = payment_id;
        self
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn processed_at(mut self, at: DateTime<Utc>) -> Self {
        self.processed_at = at;
        self
    }

    pub fn with_status(mut self, status: RefundStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> Refund {
        Refund {
            id: self.id,
            payment_id: self.payment_id,
            amount: self.amount,
            processed_at: self.processed_at,
            status: self.status,
        }
    }
}

/// Builder for test subscriptions
pub struct SubscriptionBuilder {
    id: SubscriptionId,
    status: SubscriptionStatus,
    price_per_period: Money,
    cadence: BillingCadence,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl Default for SubscriptionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionBuilder {
    pub fn new() -> Self {
        Self {
            id: SubscriptionId::new(),
            status: SubscriptionStatus::Active,
            price_per_period: Money::from_minor(10_000, Currency::USD),
            cadence: BillingCadence::Monthly,
            started_at: Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap(),
            ended_at: None,
        }
    }

    pub fn with_status(mut self, status: SubscriptionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_price(mut self, price: Money) -> Self {
        self.price_per_period = price;
        self
    }

    pub fn with_cadence(mut self, cadence: BillingCadence) -> Self {
        self.cadence = cadence;
        self
    }

    pub fn ended_at(mut self, at: DateTime<Utc>) -> Self {
        self.status = SubscriptionStatus::Cancelled;
        self.ended_at = Some(at);
        self
    }

    pub fn build(self) -> Subscription {
        Subscription {
            id: self.id,
            status: self.status,
            price_per_period: self.price_per_period,
            cadence: self.cadence,
            started_at: self.started_at,
            ended_at: self.ended_at,
        }
    }
}

/// Constructs a DateRange, panicking on invalid input (test convenience)
pub fn date_range(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateRange {
    let s = chrono::NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap();
    let e = chrono::NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap();
    DateRange::new(s, e).unwrap()
}
