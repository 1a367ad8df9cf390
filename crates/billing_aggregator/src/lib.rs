//! Billing aggregation
//!
//! Turns raw billing events into canonical financial metrics in a
//! single reporting currency: MRR/ARR, month-to-date and net revenue,
//! recognition entries, and per-jurisdiction tax liability. Fetches
//! fan out concurrently against the store port; any fetch or conversion
//! failure fails the whole call.

mod aggregator;
mod error;
mod range;
mod summary;

pub use aggregator::BillingAggregator;
pub use error::{AggregationError, Entity};
pub use range::TimeRange;
pub use summary::{AggregationRequest, BillingReport, BillingSummary};
