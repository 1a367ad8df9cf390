//! Billing Domain - Billing event entities and the store adapter port
//!
//! This crate models the four billing event types the aggregation engine
//! consumes - invoices, payments, refunds, and subscriptions - together
//! with the [`BillingStorePort`] contract for fetching them from the
//! billing system of record.
//!
//! All entities are read-only inputs: the engine never mutates or
//! persists them, and every derived figure is recomputed from source on
//! each aggregation call. Each entity offers a `normalized` operation
//! that produces a copy with its monetary fields converted to a
//! reporting currency, using the entity's own timestamp as the FX rate
//! instant.

pub mod error;
pub mod invoice;
pub mod payment;
pub mod ports;
pub mod refund;
pub mod subscription;

pub use error::BillingError;
pub use invoice::{Invoice, InvoiceStatus, Jurisdiction, LineItem, RecognitionPolicy, TaxCategory};
pub use payment::{Payment, PaymentStatus};
pub use ports::BillingStorePort;
pub use refund::{Refund, RefundStatus};
pub use subscription::{BillingCadence, Subscription, SubscriptionStatus};
