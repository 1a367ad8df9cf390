//! Core Kernel - Foundational types for the billing aggregation engine
//!
//! This crate provides the fundamental building blocks used across all
//! domain modules:
//! - Money types with exact minor-unit arithmetic
//! - FX conversion with timestamped rates and banker's rounding
//! - Temporal types separating wall-clock instants from calendar days
//! - Common identifiers and port abstractions

pub mod fx;
pub mod identifiers;
pub mod money;
pub mod ports;
pub mod temporal;

pub use fx::{FxConverter, FxError, FxRate};
pub use identifiers::{InvoiceId, PaymentId, RefundId, SubscriptionId};
pub use money::{Currency, Money, MoneyError, Rate};
pub use ports::{DomainPort, Page, PortError};
pub use temporal::{DateRange, TemporalError, TimeWindow, Timezone};
