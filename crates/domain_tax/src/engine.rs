//! Jurisdiction-aware tax aggregation
//!
//! Produces tax liability summaries grouped by jurisdiction and calendar
//! month of issue. Three buckets, disjoint by construction:
//!
//! - **due** - paid invoices in a configured jurisdiction
//! - **pending** - unpaid (draft/open/uncollectible) invoices in a
//!   configured jurisdiction; their tax is not yet owed and is never
//!   merged with due totals
//! - **unconfigured** - invoices whose jurisdiction has no configured
//!   rate; reported with their taxable amount and no tax figure, never
//!   silently taxed at 0%
//!
//! Voided invoices carry no tax liability and appear in no bucket.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use core_kernel::{Currency, DateRange, InvoiceId, Money, MoneyError, Rate, Timezone};
use domain_billing::{Invoice, Jurisdiction, LineItem};

use crate::config::TaxEngineConfig;
use crate::error::TaxError;

/// Tax liability for one jurisdiction in one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSummary {
    pub jurisdiction: Jurisdiction,
    pub period: DateRange,
    pub taxable: Money,
    pub tax: Money,
    pub rate: Rate,
}

/// Taxable volume in a jurisdiction with no configured rate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnconfiguredTax {
    pub jurisdiction: Jurisdiction,
    pub period: DateRange,
    pub taxable: Money,
    pub invoices: Vec<InvoiceId>,
}

/// Complete tax assessment over a set of invoices
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxReport {
    pub due: Vec<TaxSummary>,
    pub pending: Vec<TaxSummary>,
    pub unconfigured: Vec<UnconfiguredTax>,
}

impl TaxReport {
    /// Total tax owed on paid invoices
    pub fn total_due(&self, currency: Currency) -> Result<Money, TaxError> {
        Ok(Money::sum(self.due.iter().map(|s| &s.tax), currency)?)
    }

    /// Total tax that becomes owed once pending invoices are paid
    pub fn total_pending(&self, currency: Currency) -> Result<Money, TaxError> {
        Ok(Money::sum(self.pending.iter().map(|s| &s.tax), currency)?)
    }

    /// Total taxable volume awaiting jurisdiction configuration
    pub fn total_unconfigured_taxable(&self, currency: Currency) -> Result<Money, TaxError> {
        Ok(Money::sum(
            self.unconfigured.iter().map(|u| &u.taxable),
            currency,
        )?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Bucket {
    Due,
    Pending,
}

/// Stateless tax engine over normalized invoices
#[derive(Debug, Clone, Default)]
pub struct TaxEngine {
    config: TaxEngineConfig,
    tz: Timezone,
}

impl TaxEngine {
    pub fn new(config: TaxEngineConfig) -> Self {
        Self {
            config,
            tz: Timezone::utc(),
        }
    }

    pub fn with_timezone(mut self, tz: Timezone) -> Self {
        self.tz = tz;
        self
    }

    /// Assesses tax over a set of invoices
    ///
    /// Every non-void invoice lands in exactly one bucket. Summaries are
    /// grouped by (jurisdiction, calendar month of issue) and ordered by
    /// jurisdiction then period for deterministic output.
    pub fn assess(&self, invoices: &[Invoice]) -> Result<TaxReport, TaxError> {
        let mut taxed: HashMap<(Jurisdiction, DateRange, Bucket), TaxSummary> = HashMap::new();
        let mut unconfigured: HashMap<(Jurisdiction, DateRange), UnconfiguredTax> =
            HashMap::new();

        for invoice in invoices {
            if invoice.is_void() {
                continue;
            }

            let period = DateRange::month_of(self.tz.date_of(invoice.issued_at));
            let currency = invoice.total.currency();
            let taxable_lines: Vec<&LineItem> = invoice
                .line_items
                .iter()
                .filter(|item| !self.config.is_exempt(item.tax_category.as_ref()))
                .collect();
            let taxable = Money::sum(taxable_lines.iter().map(|item| &item.amount), currency)?;

            match self.config.rate_for(&invoice.jurisdiction) {
                Some(rate) => {
                    let tax_minor: i64 =
                        allocate_line_taxes(&taxable_lines, rate)?.iter().sum();
                    let bucket = if invoice.is_paid() {
                        Bucket::Due
                    } else {
                        Bucket::Pending
                    };

                    let key = (invoice.jurisdiction.clone(), period, bucket);
                    let entry = taxed.entry(key).or_insert_with(|| TaxSummary {
                        jurisdiction: invoice.jurisdiction.clone(),
                        period,
                        taxable: Money::zero(currency),
                        tax: Money::zero(currency),
                        rate,
                    });
                    entry.taxable = entry.taxable.checked_add(&taxable)?;
                    entry.tax = entry
                        .tax
                        .checked_add(&Money::from_minor(tax_minor, currency))?;
                }
                None => {
                    debug!(
                        jurisdiction = %invoice.jurisdiction,
                        invoice = %invoice.id,
                        "no tax rate configured; reporting unconfigured"
                    );
                    let key = (invoice.jurisdiction.clone(), period);
                    let entry = unconfigured.entry(key).or_insert_with(|| UnconfiguredTax {
                        jurisdiction: invoice.jurisdiction.clone(),
                        period,
                        taxable: Money::zero(currency),
                        invoices: Vec::new(),
                    });
                    entry.taxable = entry.taxable.checked_add(&taxable)?;
                    entry.invoices.push(invoice.id);
                }
            }
        }

        let mut report = TaxReport::default();
        for ((_, _, bucket), summary) in taxed {
            match bucket {
                Bucket::Due => report.due.push(summary),
                Bucket::Pending => report.pending.push(summary),
            }
        }
        report.unconfigured.extend(unconfigured.into_values());

        let by_group = |s: &TaxSummary| (s.jurisdiction.as_str().to_string(), s.period.start);
        report.due.sort_by_key(by_group);
        report.pending.sort_by_key(by_group);
        report
            .unconfigured
            .sort_by_key(|u| (u.jurisdiction.as_str().to_string(), u.period.start));

        Ok(report)
    }
}

/// Allocates an invoice's tax across its taxable line items
///
/// Per-line tax is the difference of floored cumulative values, so the
/// allocation telescopes: the invoice total is exactly
/// `floor(taxable × rate)` with no per-line penny drift.
fn allocate_line_taxes(lines: &[&LineItem], rate: Rate) -> Result<Vec<i64>, TaxError> {
    let mut taxes = Vec::with_capacity(lines.len());
    let mut exact_cum = Decimal::ZERO;
    let mut floored_prev = 0i64;

    for line in lines {
        exact_cum += Decimal::from(line.amount.minor_units()) * rate.as_decimal();
        let floored = exact_cum.floor().to_i64().ok_or(MoneyError::Overflow)?;
        taxes.push(floored - floored_prev);
        floored_prev = floored;
    }
    Ok(taxes)
}
