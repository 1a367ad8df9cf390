//! Ratable revenue recognition
//!
//! Allocates each invoice line item's amount across the calendar days of
//! its service period and answers two questions: how much revenue is
//! recognized within an arbitrary query window, and how much remains
//! deferred as of a point in time.
//!
//! # Rounding discipline
//!
//! Recognition is computed as a *cumulative* function of the calendar
//! day: `cum(d) = floor(exact(d))`, with the exact accrual carried in
//! `Decimal`. The amount recognized in a window is the difference of two
//! cumulative values. Flooring the cumulative value rather than each
//! window independently means every intermediate window is floored and
//! the running remainder lands in the final period, so the sum of any
//! disjoint cover of the service period equals the item's total exactly.
//!
//! # Refunds
//!
//! A succeeded refund reduces the daily accrual of its invoice's line
//! items proportionally - by `refund / invoice total` - from the refund's
//! processing date onward. Days already accrued are never revisited.
//!
//! # Voided invoices
//!
//! A voided invoice's recognition is frozen at its void date: amounts
//! recognized up to that day stand, and nothing accrues after it.

use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{Currency, DateRange, InvoiceId, Money, MoneyError, Timezone};
use domain_billing::{Invoice, LineItem, Payment, RecognitionPolicy, Refund};

use crate::error::RecognitionError;

/// Revenue recognized for one invoice within one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionEntry {
    pub invoice_id: InvoiceId,
    /// The slice of the query window this entry covers
    pub period: DateRange,
    pub recognized: Money,
}

/// A prospective accrual reduction derived from a refund
#[derive(Debug, Clone, Copy, PartialEq)]
struct Adjustment {
    /// First day the reduced accrual applies
    effective: NaiveDate,
    /// Fraction of the invoice total refunded
    fraction: Decimal,
}

/// Stateless ratable recognition engine
///
/// Operates over invoices already normalized to a single reporting
/// currency. Constructed per reporting timezone; calendar days are
/// derived from entity instants through it.
#[derive(Debug, Clone, Default)]
pub struct RecognitionEngine {
    tz: Timezone,
}

impl RecognitionEngine {
    pub fn new() -> Self {
        Self {
            tz: Timezone::utc(),
        }
    }

    pub fn with_timezone(tz: Timezone) -> Self {
        Self { tz }
    }

    /// Revenue recognized per invoice within the query window
    ///
    /// Produces one entry per line item with any recognition in the
    /// window, its period clipped to the window. Voided invoices still
    /// contribute what they had recognized before their void date.
    pub fn entries_for_window(
        &self,
        invoices: &[Invoice],
        payments: &[Payment],
        refunds: &[Refund],
        window: DateRange,
    ) -> Result<Vec<RecognitionEntry>, RecognitionError> {
        let mut entries = Vec::new();

        for invoice in invoices {
            let adjustments = self.adjustments_for(invoice, payments, refunds);
            let freeze = self.freeze_date(invoice);

            for item in &invoice.line_items {
                let before_window = window.start - Duration::days(1);
                let minor = self.cumulative(item, &adjustments, freeze, window.end)?
                    - self.cumulative(item, &adjustments, freeze, before_window)?;
                if minor == 0 {
                    continue;
                }

                let period = match item.period.overlap(&window) {
                    Some(overlap) => overlap,
                    None => continue,
                };
                entries.push(RecognitionEntry {
                    invoice_id: invoice.id,
                    period,
                    recognized: Money::from_minor(minor, item.amount.currency()),
                });
            }
        }

        debug!(
            window = %window,
            entries = entries.len(),
            "computed recognition entries"
        );
        Ok(entries)
    }

    /// Total revenue recognized across non-void invoices up to `as_of`
    ///
    /// Scoped to the same invoice set as [`deferred_balance`], so the two
    /// always sum to the total invoiced over non-void invoices. Frozen
    /// recognition on voided invoices is reported by
    /// [`entries_for_window`] but takes no part in this ledger.
    ///
    /// [`deferred_balance`]: Self::deferred_balance
    /// [`entries_for_window`]: Self::entries_for_window
    pub fn recognized_to_date(
        &self,
        invoices: &[Invoice],
        payments: &[Payment],
        refunds: &[Refund],
        as_of: NaiveDate,
        currency: Currency,
    ) -> Result<Money, RecognitionError> {
        let mut total = Money::zero(currency);
        for invoice in invoices {
            if invoice.is_void() {
                continue;
            }
            let adjustments = self.adjustments_for(invoice, payments, refunds);
            for item in &invoice.line_items {
                let minor = self.cumulative(item, &adjustments, None, as_of)?;
                total = total
                    .checked_add(&Money::from_minor(minor, item.amount.currency()))?;
            }
        }
        Ok(total)
    }

    /// Deferred revenue balance as of a calendar day
    ///
    /// The invoiced amount not yet recognized, summed over all non-void
    /// invoices. At every instant `deferred + recognized-to-date` equals
    /// the total invoiced (void invoices excluded on both sides).
    pub fn deferred_balance(
        &self,
        invoices: &[Invoice],
        payments: &[Payment],
        refunds: &[Refund],
        as_of: NaiveDate,
        currency: Currency,
    ) -> Result<Money, RecognitionError> {
        let mut total = Money::zero(currency);
        for invoice in invoices {
            if invoice.is_void() {
                continue;
            }
            let adjustments = self.adjustments_for(invoice, payments, refunds);
            for item in &invoice.line_items {
                let recognized = self.cumulative(item, &adjustments, None, as_of)?;
                let remaining = Money::from_minor(
                    item.amount.minor_units() - recognized,
                    item.amount.currency(),
                );
                total = total.checked_add(&remaining)?;
            }
        }
        Ok(total)
    }

    /// Cumulative minor units recognized for one line item through `as_of`
    ///
    /// Monotonic in `as_of`; window amounts are differences of this
    /// function. `freeze` clamps accrual for voided invoices.
    fn cumulative(
        &self,
        item: &LineItem,
        adjustments: &[Adjustment],
        freeze: Option<NaiveDate>,
        as_of: NaiveDate,
    ) -> Result<i64, RecognitionError> {
        let as_of = match freeze {
            Some(frozen) => as_of.min(frozen),
            None => as_of,
        };

        // Point-in-time charges (and Immediate policy) earn everything on
        // a single day, at that day's accrual factor.
        let point_day = match item.policy {
            RecognitionPolicy::Immediate => Some(item.period.start),
            RecognitionPolicy::Ratable if item.period.start == item.period.end => {
                Some(item.period.start)
            }
            RecognitionPolicy::Ratable => None,
        };
        if let Some(day) = point_day {
            if as_of < day {
                return Ok(0);
            }
            let factor = Self::factor_on(adjustments, day);
            let exact = Decimal::from(item.amount.minor_units()) * factor;
            return Ok(exact.floor().to_i64().ok_or(MoneyError::Overflow)?);
        }

        if as_of < item.period.start {
            return Ok(0);
        }
        let upto = as_of.min(item.period.end);
        let total_days = Decimal::from(item.period.days());

        // Accrue day counts per factor segment; segment boundaries sit at
        // adjustment effective dates.
        let mut accrued_days = Decimal::ZERO;
        let mut factor = Decimal::ONE;
        let mut cursor = item.period.start;

        for adj in adjustments {
            if adj.effective <= cursor {
                factor = (factor - adj.fraction).max(Decimal::ZERO);
                continue;
            }
            if adj.effective > upto {
                break;
            }
            let seg_end = adj.effective - Duration::days(1);
            if cursor <= seg_end {
                let days = (seg_end - cursor).num_days() + 1;
                accrued_days += Decimal::from(days) * factor;
                cursor = adj.effective;
            }
            factor = (factor - adj.fraction).max(Decimal::ZERO);
        }
        if cursor <= upto {
            let days = (upto - cursor).num_days() + 1;
            accrued_days += Decimal::from(days) * factor;
        }

        let exact = Decimal::from(item.amount.minor_units()) * accrued_days / total_days;
        Ok(exact.floor().to_i64().ok_or(MoneyError::Overflow)?)
    }

    /// The accrual factor in force on a given day
    fn factor_on(adjustments: &[Adjustment], day: NaiveDate) -> Decimal {
        let mut factor = Decimal::ONE;
        for adj in adjustments {
            if adj.effective <= day {
                factor = (factor - adj.fraction).max(Decimal::ZERO);
            }
        }
        factor
    }

    /// Succeeded refunds against this invoice, as sorted accrual adjustments
    fn adjustments_for(
        &self,
        invoice: &Invoice,
        payments: &[Payment],
        refunds: &[Refund],
    ) -> Vec<Adjustment> {
        if invoice.total.is_zero() {
            return Vec::new();
        }

        let mut adjustments: Vec<Adjustment> = refunds
            .iter()
            .filter(|refund| refund.is_succeeded())
            .filter_map(|refund| {
                let payment = payments.iter().find(|p| p.id == refund.payment_id)?;
                if payment.invoice_id != Some(invoice.id) {
                    return None;
                }
                Some(Adjustment {
                    effective: self.tz.date_of(refund.processed_at),
                    fraction: Decimal::from(refund.amount.minor_units())
                        / Decimal::from(invoice.total.minor_units()),
                })
            })
            .collect();

        adjustments.sort_by_key(|adj| adj.effective);
        adjustments
    }

    fn freeze_date(&self, invoice: &Invoice) -> Option<NaiveDate> {
        if invoice.is_void() {
            invoice.voided_at.map(|at| self.tz.date_of(at))
        } else {
            None
        }
    }
}
