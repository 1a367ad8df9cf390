//! In-memory billing store adapter
//!
//! Implements [`BillingStorePort`] over plain vectors, with per-entity
//! failure injection and optional artificial latency for deadline tests.

use std::time::Duration;

use async_trait::async_trait;

use core_kernel::{DomainPort, Page, PortError, TimeWindow};
use domain_billing::{BillingStorePort, Invoice, Payment, Refund, Subscription};

/// Which fetch, if any, the store should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailingFetch {
    Invoices,
    Payments,
    Refunds,
    Subscriptions,
}

/// A `BillingStorePort` backed by in-memory vectors
///
/// Window filtering matches the production contract: invoices by
/// `issued_at`, payments and refunds by `processed_at`; subscriptions are
/// returned when live at any point in the window.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBillingStore {
    invoices: Vec<Invoice>,
    payments: Vec<Payment>,
    refunds: Vec<Refund>,
    subscriptions: Vec<Subscription>,
    failing: Option<FailingFetch>,
    latency: Option<Duration>,
}

impl InMemoryBillingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_invoices(mut self, invoices: Vec<Invoice>) -> Self {
        self.invoices = invoices;
        self
    }

    pub fn with_payments(mut self, payments: Vec<Payment>) -> Self {
        self.payments = payments;
        self
    }

    pub fn with_refunds(mut self, refunds: Vec<Refund>) -> Self {
        self.refunds = refunds;
        self
    }

    pub fn with_subscriptions(mut self, subscriptions: Vec<Subscription>) -> Self {
        self.subscriptions = subscriptions;
        self
    }

    /// Makes one of the four fetches fail with a connection error
    pub fn failing_on(mut self, fetch: FailingFetch) -> Self {
        self.failing = Some(fetch);
        self
    }

    /// Adds artificial latency to every fetch
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    async fn simulate(&self, fetch: FailingFetch) -> Result<(), PortError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing == Some(fetch) {
            return Err(PortError::connection(format!(
                "injected failure on {fetch:?}"
            )));
        }
        Ok(())
    }
}

impl DomainPort for InMemoryBillingStore {}

#[async_trait]
impl BillingStorePort for InMemoryBillingStore {
    async fn list_invoices(&self, window: TimeWindow) -> Result<Page<Invoice>, PortError> {
        self.simulate(FailingFetch::Invoices).await?;
        let items = self
            .invoices
            .iter()
            .filter(|i| window.contains(i.issued_at))
            .cloned()
            .collect();
        Ok(Page::complete(items))
    }

    async fn list_payments(&self, window: TimeWindow) -> Result<Page<Payment>, PortError> {
        self.simulate(FailingFetch::Payments).await?;
        let items = self
            .payments
            .iter()
            .filter(|p| window.contains(p.processed_at))
            .cloned()
            .collect();
        Ok(Page::complete(items))
    }

    async fn list_refunds(&self, window: TimeWindow) -> Result<Page<Refund>, PortError> {
        self.simulate(FailingFetch::Refunds).await?;
        let items = self
            .refunds
            .iter()
            .filter(|r| window.contains(r.processed_at))
            .cloned()
            .collect();
        Ok(Page::complete(items))
    }

    async fn list_subscriptions(
        &self,
        window: TimeWindow,
    ) -> Result<Page<Subscription>, PortError> {
        self.simulate(FailingFetch::Subscriptions).await?;
        let items = self
            .subscriptions
            .iter()
            .filter(|s| {
                s.started_at <= window.to && s.ended_at.map_or(true, |end| end >= window.from)
            })
            .cloned()
            .collect();
        Ok(Page::complete(items))
    }
}
