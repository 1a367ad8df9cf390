//! Tax domain errors

use core_kernel::MoneyError;
use thiserror::Error;

/// Errors that can occur during tax assessment
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxError {
    #[error(transparent)]
    Money(#[from] MoneyError),
}
