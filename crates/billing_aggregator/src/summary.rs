//! Aggregation output shapes

use serde::{Deserialize, Serialize};

use core_kernel::Currency;
use domain_recognition::RecognitionEntry;
use domain_tax::TaxReport;

use crate::range::TimeRange;

/// What the caller wants aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationRequest {
    pub range: TimeRange,
    pub reporting_currency: Currency,
    pub include_recognition: bool,
    pub include_tax: bool,
}

impl AggregationRequest {
    pub fn new(range: TimeRange, reporting_currency: Currency) -> Self {
        Self {
            range,
            reporting_currency,
            include_recognition: false,
            include_tax: false,
        }
    }

    pub fn with_recognition(mut self) -> Self {
        self.include_recognition = true;
        self
    }

    pub fn with_tax(mut self) -> Self {
        self.include_tax = true;
        self
    }
}

impl Default for AggregationRequest {
    fn default() -> Self {
        Self::new(TimeRange::default(), Currency::USD)
    }
}

/// The canonical financial metrics, all in the reporting currency's
/// minor units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingSummary {
    pub mrr_cents: i64,
    pub arr_cents: i64,
    pub month_to_date_cents: i64,
    pub net_revenue_cents: i64,
    pub refunds_cents: i64,
    pub disputes_open: u64,
    pub invoices_this_month: u64,
    pub adjustments_pending: u64,
}

/// One aggregation call's complete output
///
/// Recognition entries and the tax report are populated only when the
/// request asked for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingReport {
    pub reporting_currency: Currency,
    pub summary: BillingSummary,
    pub recognition: Option<Vec<RecognitionEntry>>,
    pub tax: Option<TaxReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = BillingSummary {
            mrr_cents: 10000,
            arr_cents: 120000,
            month_to_date_cents: 5000,
            net_revenue_cents: 4500,
            refunds_cents: 500,
            disputes_open: 1,
            invoices_this_month: 3,
            adjustments_pending: 2,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["mrrCents"], 10000);
        assert_eq!(json["arrCents"], 120000);
        assert_eq!(json["monthToDateCents"], 5000);
        assert_eq!(json["netRevenueCents"], 4500);
        assert_eq!(json["refundsCents"], 500);
        assert_eq!(json["disputesOpen"], 1);
        assert_eq!(json["invoicesThisMonth"], 3);
        assert_eq!(json["adjustmentsPending"], 2);
    }

    #[test]
    fn test_default_request() {
        let req = AggregationRequest::default();
        assert_eq!(req.range, TimeRange::Last30Days);
        assert_eq!(req.reporting_currency, Currency::USD);
        assert!(!req.include_recognition);
        assert!(!req.include_tax);
    }
}
