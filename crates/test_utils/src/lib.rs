//! Test Utilities Crate
//!
//! Shared test infrastructure for the billing engine workspace.
//!
//! # Modules
//!
//! - `builders`: Builder patterns for billing event construction
//! - `fixtures`: Pre-built money, temporal, and FX test data
//! - `store`: In-memory `BillingStorePort` with failure injection

pub mod builders;
pub mod fixtures;
pub mod store;

pub use builders::*;
pub use fixtures::*;
pub use store::*;

use once_cell::sync::Lazy;

static TRACING: Lazy<()> = Lazy::new(|| {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .init();
});

/// Initializes test tracing once per process
pub fn init_test_tracing() {
    Lazy::force(&TRACING);
}
