//! Recognition domain errors

use core_kernel::MoneyError;
use thiserror::Error;

/// Errors that can occur during revenue recognition
///
/// Per-invoice data anomalies (zero-length periods, refunds exceeding the
/// invoice total) are handled as defined edge cases and never surface
/// here; only structural arithmetic problems do.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecognitionError {
    #[error(transparent)]
    Money(#[from] MoneyError),
}
