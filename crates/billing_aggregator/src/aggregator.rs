//! The billing aggregator
//!
//! One aggregation call resolves a reporting window, fans out four
//! concurrent store fetches, normalizes every monetary field to the
//! reporting currency, and compiles the summary metrics. The instance
//! is stateless per call: it holds long-lived handles to the store and
//! FX converter but caches nothing across calls, so every call
//! recomputes from source.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use core_kernel::{Currency, FxConverter, Money, MoneyError, TimeWindow, Timezone};
use domain_billing::{BillingStorePort, Invoice, InvoiceStatus, Payment, Refund, Subscription};
use domain_recognition::RecognitionEngine;
use domain_tax::{TaxEngine, TaxEngineConfig};

use crate::error::{AggregationError, Entity};
use crate::summary::{AggregationRequest, BillingReport, BillingSummary};

pub struct BillingAggregator {
    store: Arc<dyn BillingStorePort>,
    fx: Arc<FxConverter>,
    tax_config: TaxEngineConfig,
    tz: Timezone,
}

impl BillingAggregator {
    pub fn new(
        store: Arc<dyn BillingStorePort>,
        fx: Arc<FxConverter>,
        tax_config: TaxEngineConfig,
    ) -> Self {
        Self {
            store,
            fx,
            tax_config,
            tz: Timezone::utc(),
        }
    }

    /// Sets the reporting timezone used for calendar boundaries
    pub fn with_timezone(mut self, tz: Timezone) -> Self {
        self.tz = tz;
        self
    }

    /// Aggregates against the current instant
    pub async fn aggregate(
        &self,
        req: &AggregationRequest,
    ) -> Result<BillingReport, AggregationError> {
        self.aggregate_at(req, Utc::now()).await
    }

    /// Aggregates with a caller-supplied deadline over the whole call
    ///
    /// The deadline is propagated, not retried: retry policy belongs to
    /// the caller.
    pub async fn aggregate_with_deadline(
        &self,
        req: &AggregationRequest,
        deadline: Duration,
    ) -> Result<BillingReport, AggregationError> {
        tokio::time::timeout(deadline, self.aggregate(req))
            .await
            .map_err(|_| AggregationError::Timeout(deadline.as_millis() as u64))?
    }

    /// Aggregates against an explicit reference instant
    ///
    /// Fails whole on any fetch or conversion error, never a partial
    /// summary.
    #[instrument(skip(self, req), fields(range = %req.range, currency = %req.reporting_currency))]
    pub async fn aggregate_at(
        &self,
        req: &AggregationRequest,
        now: DateTime<Utc>,
    ) -> Result<BillingReport, AggregationError> {
        let window = req.range.resolve(now);

        let (invoices, payments, refunds, subscriptions) = self.fetch_all(window).await?;
        debug!(
            invoices = invoices.len(),
            payments = payments.len(),
            refunds = refunds.len(),
            subscriptions = subscriptions.len(),
            "fetched billing events"
        );

        let reporting = req.reporting_currency;
        let invoices: Vec<Invoice> = invoices
            .iter()
            .map(|i| i.normalized(&self.fx, reporting))
            .collect::<Result<_, _>>()?;
        let payments: Vec<Payment> = payments
            .iter()
            .map(|p| p.normalized(&self.fx, reporting))
            .collect::<Result<_, _>>()?;
        let refunds: Vec<Refund> = refunds
            .iter()
            .map(|r| r.normalized(&self.fx, reporting))
            .collect::<Result<_, _>>()?;
        let subscriptions: Vec<Subscription> = subscriptions
            .iter()
            .map(|s| s.normalized(&self.fx, reporting, now))
            .collect::<Result<_, _>>()?;

        let summary = self.compile_summary(reporting, &invoices, &refunds, &subscriptions, now)?;

        let (recognition, tax) = tokio::join!(
            async {
                if !req.include_recognition {
                    return Ok(None);
                }
                let engine = RecognitionEngine::with_timezone(self.tz);
                engine
                    .entries_for_window(
                        &invoices,
                        &payments,
                        &refunds,
                        window.to_date_range(&self.tz),
                    )
                    .map(Some)
            },
            async {
                if !req.include_tax {
                    return Ok(None);
                }
                let engine = TaxEngine::new(self.tax_config.clone()).with_timezone(self.tz);
                engine.assess(&invoices).map(Some)
            }
        );

        info!(
            mrr_cents = summary.mrr_cents,
            net_revenue_cents = summary.net_revenue_cents,
            "compiled billing summary"
        );
        Ok(BillingReport {
            reporting_currency: reporting,
            summary,
            recognition: recognition?,
            tax: tax?,
        })
    }

    /// Fans out the four store fetches and waits for all of them
    ///
    /// Each fetch writes its own result slot; merging happens only after
    /// all four complete. Any failure fails the whole call, tagged with
    /// the entity that failed.
    async fn fetch_all(
        &self,
        window: TimeWindow,
    ) -> Result<(Vec<Invoice>, Vec<Payment>, Vec<Refund>, Vec<Subscription>), AggregationError>
    {
        let (invoices, payments, refunds, subscriptions) = tokio::try_join!(
            async {
                self.store
                    .list_invoices(window)
                    .await
                    .map_err(AggregationError::fetch(Entity::Invoices))
            },
            async {
                self.store
                    .list_payments(window)
                    .await
                    .map_err(AggregationError::fetch(Entity::Payments))
            },
            async {
                self.store
                    .list_refunds(window)
                    .await
                    .map_err(AggregationError::fetch(Entity::Refunds))
            },
            async {
                self.store
                    .list_subscriptions(window)
                    .await
                    .map_err(AggregationError::fetch(Entity::Subscriptions))
            },
        )?;
        Ok((
            invoices.items,
            payments.items,
            refunds.items,
            subscriptions.items,
        ))
    }

    fn compile_summary(
        &self,
        reporting: Currency,
        invoices: &[Invoice],
        refunds: &[Refund],
        subscriptions: &[Subscription],
        now: DateTime<Utc>,
    ) -> Result<BillingSummary, AggregationError> {
        let month_start = self.tz.month_start(now);

        let mut mrr = Money::zero(reporting);
        for sub in subscriptions.iter().filter(|s| s.is_active()) {
            mrr = mrr.checked_add(&sub.monthly_amount()?)?;
        }
        let arr_cents = mrr
            .minor_units()
            .checked_mul(12)
            .ok_or(MoneyError::Overflow)?;

        let mut month_to_date = Money::zero(reporting);
        for invoice in invoices.iter().filter(|i| i.is_paid()) {
            if let Some(paid_at) = invoice.paid_at {
                if paid_at >= month_start && paid_at <= now {
                    month_to_date = month_to_date.checked_add(&invoice.total)?;
                }
            }
        }

        let mut refunded = Money::zero(reporting);
        for refund in refunds.iter().filter(|r| r.is_succeeded()) {
            if refund.processed_at >= month_start && refund.processed_at <= now {
                refunded = refunded.checked_add(&refund.amount)?;
            }
        }

        let net_revenue = month_to_date.checked_sub(&refunded)?;

        let disputes_open = invoices
            .iter()
            .filter(|i| i.status == InvoiceStatus::Uncollectible)
            .count() as u64;
        let invoices_this_month = invoices
            .iter()
            .filter(|i| i.issued_at >= month_start)
            .count() as u64;
        let adjustments_pending = invoices
            .iter()
            .filter(|i| i.status == InvoiceStatus::Open)
            .count() as u64;

        Ok(BillingSummary {
            mrr_cents: mrr.minor_units(),
            arr_cents,
            month_to_date_cents: month_to_date.minor_units(),
            net_revenue_cents: net_revenue.minor_units(),
            refunds_cents: refunded.minor_units(),
            disputes_open,
            invoices_this_month,
            adjustments_pending,
        })
    }
}
