//! Tax Domain - Jurisdiction-aware tax liability aggregation
//!
//! Computes tax summaries grouped by jurisdiction and period from
//! normalized invoices and a jurisdiction rate configuration. Pending
//! tax (unpaid invoices) and due tax (paid invoices) are reported as
//! separate totals, and jurisdictions without a configured rate surface
//! in a dedicated bucket rather than defaulting to a zero rate.

pub mod config;
pub mod engine;
pub mod error;

pub use config::TaxEngineConfig;
pub use engine::{TaxEngine, TaxReport, TaxSummary, UnconfiguredTax};
pub use error::TaxError;
