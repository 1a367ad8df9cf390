use core_kernel::{FxError, MoneyError, PortError};
use domain_billing::BillingError;
use domain_recognition::RecognitionError;
use domain_tax::TaxError;
use thiserror::Error;

/// The billing entity whose fetch or normalization failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Invoices,
    Payments,
    Refunds,
    Subscriptions,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Entity::Invoices => "invoices",
            Entity::Payments => "payments",
            Entity::Refunds => "refunds",
            Entity::Subscriptions => "subscriptions",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("failed to fetch {entity}: {source}")]
    StoreFetch {
        entity: Entity,
        #[source]
        source: PortError,
    },

    #[error("aggregation deadline of {0}ms exceeded")]
    Timeout(u64),

    #[error(transparent)]
    Fx(#[from] FxError),

    #[error(transparent)]
    Money(#[from] MoneyError),

    #[error(transparent)]
    Billing(#[from] BillingError),

    #[error(transparent)]
    Recognition(#[from] RecognitionError),

    #[error(transparent)]
    Tax(#[from] TaxError),
}

impl AggregationError {
    pub(crate) fn fetch(entity: Entity) -> impl FnOnce(PortError) -> AggregationError {
        move |source| AggregationError::StoreFetch { entity, source }
    }
}
