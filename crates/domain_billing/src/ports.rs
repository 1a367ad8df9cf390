//! Billing Event Store port
//!
//! The store adapter is an external collaborator: a billing system of
//! record that can list invoices, payments, refunds, and subscriptions
//! within a time window. This engine defines only the contract; the
//! production adapter lives with the system of record, and an in-memory
//! adapter for tests lives in `test_utils`.
//!
//! Within one aggregation call all four fetched entity sets reflect the
//! same window. There is no cross-call consistency guarantee: a second
//! call made moments later may observe additional records if the store
//! is still ingesting.

use async_trait::async_trait;

use core_kernel::{DomainPort, Page, PortError, TimeWindow};

use crate::invoice::Invoice;
use crate::payment::Payment;
use crate::refund::Refund;
use crate::subscription::Subscription;

/// Read-only access to billing events within a time window
///
/// All four fetches are paginated at the contract level (`Page` carries
/// the total count); implementations are expected to resolve pagination
/// internally and return the full window.
#[async_trait]
pub trait BillingStorePort: DomainPort {
    /// Lists invoices issued within the window
    async fn list_invoices(&self, window: TimeWindow) -> Result<Page<Invoice>, PortError>;

    /// Lists payments processed within the window
    async fn list_payments(&self, window: TimeWindow) -> Result<Page<Payment>, PortError>;

    /// Lists refunds processed within the window
    async fn list_refunds(&self, window: TimeWindow) -> Result<Page<Refund>, PortError>;

    /// Lists subscriptions live at any point within the window
    async fn list_subscriptions(
        &self,
        window: TimeWindow,
    ) -> Result<Page<Subscription>, PortError>;
}
