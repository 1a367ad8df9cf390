//! Billing domain errors

use core_kernel::MoneyError;
use thiserror::Error;

/// Errors that can occur in the billing domain
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BillingError {
    /// A cadence string named no known billing cadence
    #[error("Unknown billing cadence: {0}")]
    UnknownCadence(String),

    /// A normalized amount left the representable range
    #[error("Amount out of range")]
    AmountOutOfRange,

    /// Money arithmetic failed
    #[error(transparent)]
    Money(#[from] MoneyError),
}
