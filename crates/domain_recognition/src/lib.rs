//! Recognition Domain - Ratable revenue recognition
//!
//! Allocates invoiced amounts across the accounting periods they are
//! earned in, rather than the moment they are billed. The engine is a
//! pure transform over already-fetched, already-FX-normalized invoices:
//! it holds no state and recomputes from its inputs on every call.
//!
//! Two invariants hold by construction:
//! - **Rounding closure**: the recognized amounts of any disjoint cover
//!   of a line item's service period sum exactly to the item's amount.
//! - **Deferred identity**: at any day `t`,
//!   `deferred_balance(t) + recognized_to_date(t)` equals the total
//!   invoiced over non-void invoices.

pub mod error;
pub mod recognition;

pub use error::RecognitionError;
pub use recognition::{RecognitionEngine, RecognitionEntry};
