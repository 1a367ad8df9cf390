//! Tests for ratable revenue recognition

use chrono::{Duration, NaiveDate, TimeZone, Utc};

use core_kernel::{Currency, DateRange, Money};
use domain_billing::{Invoice, LineItem, Payment, RecognitionPolicy, Refund};
use domain_recognition::RecognitionEngine;
use test_utils::{InvoiceBuilder, PaymentBuilder, RefundBuilder};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn usd(minor: i64) -> Money {
    Money::from_minor(minor, Currency::USD)
}

fn ratable_invoice(minor: i64, period: DateRange) -> Invoice {
    InvoiceBuilder::new()
        .with_line_item(LineItem::new(usd(minor), period, RecognitionPolicy::Ratable))
        .build()
}

fn recognized(
    engine: &RecognitionEngine,
    invoices: &[Invoice],
    payments: &[Payment],
    refunds: &[Refund],
    window: DateRange,
) -> i64 {
    engine
        .entries_for_window(invoices, payments, refunds, window)
        .unwrap()
        .iter()
        .map(|e| e.recognized.minor_units())
        .sum()
}

#[test]
fn test_evenly_divisible_period_has_no_remainder() {
    // $1200 over a 360-day period; a 30-day window is exactly 1/12
    let engine = RecognitionEngine::new();
    let period = DateRange::new(d(2024, 1, 1), d(2024, 1, 1) + Duration::days(359)).unwrap();
    let invoice = ratable_invoice(120_000, period);

    let window = DateRange::new(d(2024, 1, 1), d(2024, 1, 30)).unwrap();
    assert_eq!(recognized(&engine, &[invoice], &[], &[], window), 10_000);
}

#[test]
fn test_partial_window_floors_and_final_period_absorbs_remainder() {
    // $1000 over 365 days (2023 is not a leap year)
    let engine = RecognitionEngine::new();
    let period = DateRange::new(d(2023, 1, 1), d(2023, 12, 31)).unwrap();
    assert_eq!(period.days(), 365);
    let invoice = ratable_invoice(100_000, period);

    // First 10 days: floor(100000 * 10/365) = 2739
    let first_ten = DateRange::new(d(2023, 1, 1), d(2023, 1, 10)).unwrap();
    assert_eq!(
        recognized(&engine, std::slice::from_ref(&invoice), &[], &[], first_ten),
        2_739
    );

    // Every calendar month, summed, recovers the exact total
    let mut total = 0;
    for month in 1..=12 {
        let window = DateRange::month_of(d(2023, month, 1));
        total += recognized(&engine, std::slice::from_ref(&invoice), &[], &[], window);
    }
    assert_eq!(total, 100_000);
}

#[test]
fn test_point_in_time_charge() {
    let engine = RecognitionEngine::new();
    let charge_day = d(2024, 3, 15);
    let invoice = ratable_invoice(5_000, DateRange::single_day(charge_day));

    let covering = DateRange::new(d(2024, 3, 1), d(2024, 3, 31)).unwrap();
    assert_eq!(
        recognized(&engine, std::slice::from_ref(&invoice), &[], &[], covering),
        5_000
    );

    let missing = DateRange::new(d(2024, 4, 1), d(2024, 4, 30)).unwrap();
    assert_eq!(
        recognized(&engine, std::slice::from_ref(&invoice), &[], &[], missing),
        0
    );
}

#[test]
fn test_immediate_policy_recognizes_on_period_start() {
    let engine = RecognitionEngine::new();
    let period = DateRange::new(d(2024, 1, 1), d(2024, 12, 31)).unwrap();
    let invoice = InvoiceBuilder::new()
        .with_line_item(LineItem::new(usd(9_900), period, RecognitionPolicy::Immediate))
        .build();

    let january = DateRange::month_of(d(2024, 1, 1));
    assert_eq!(
        recognized(&engine, std::slice::from_ref(&invoice), &[], &[], january),
        9_900
    );
    let february = DateRange::month_of(d(2024, 2, 1));
    assert_eq!(
        recognized(&engine, std::slice::from_ref(&invoice), &[], &[], february),
        0
    );
}

#[test]
fn test_void_freezes_recognition() {
    let engine = RecognitionEngine::new();
    // 20 equal days of $10
    let period = DateRange::new(d(2024, 1, 1), d(2024, 1, 20)).unwrap();
    let invoice = InvoiceBuilder::new()
        .with_line_item(LineItem::new(usd(20_000), period, RecognitionPolicy::Ratable))
        .voided(Utc.with_ymd_and_hms(2024, 1, 10, 15, 0, 0).unwrap())
        .build();

    // Frozen at day 10: 10 of 20 days accrued, never reversed
    let whole = DateRange::new(d(2024, 1, 1), d(2024, 12, 31)).unwrap();
    assert_eq!(
        recognized(&engine, std::slice::from_ref(&invoice), &[], &[], whole),
        10_000
    );

    // Nothing accrues after the void date
    let after = DateRange::new(d(2024, 1, 11), d(2024, 1, 20)).unwrap();
    assert_eq!(
        recognized(&engine, std::slice::from_ref(&invoice), &[], &[], after),
        0
    );
}

#[test]
fn test_refund_reduces_future_periods_prospectively() {
    let engine = RecognitionEngine::new();
    // $200 over 20 days; $50 refund (25%) effective day 11
    let period = DateRange::new(d(2024, 1, 1), d(2024, 1, 20)).unwrap();
    let invoice = ratable_invoice(20_000, period);
    let payment = PaymentBuilder::new()
        .with_invoice_id(invoice.id)
        .with_amount(usd(20_000))
        .build();
    let refund = RefundBuilder::new()
        .with_payment_id(payment.id)
        .with_amount(usd(5_000))
        .processed_at(Utc.with_ymd_and_hms(2024, 1, 11, 8, 0, 0).unwrap())
        .build();

    let invoices = [invoice];
    let payments = [payment];
    let refunds = [refund];

    // Days before the refund are unchanged
    let before = DateRange::new(d(2024, 1, 1), d(2024, 1, 10)).unwrap();
    assert_eq!(
        recognized(&engine, &invoices, &payments, &refunds, before),
        10_000
    );

    // Days from the refund onward accrue at 75%
    let after = DateRange::new(d(2024, 1, 11), d(2024, 1, 20)).unwrap();
    assert_eq!(
        recognized(&engine, &invoices, &payments, &refunds, after),
        7_500
    );

    // Whole period: 10 full days + 10 reduced days
    let whole = DateRange::new(d(2024, 1, 1), d(2024, 1, 20)).unwrap();
    assert_eq!(
        recognized(&engine, &invoices, &payments, &refunds, whole),
        17_500
    );
}

#[test]
fn test_refund_without_matching_payment_is_ignored() {
    let engine = RecognitionEngine::new();
    let period = DateRange::new(d(2024, 1, 1), d(2024, 1, 10)).unwrap();
    let invoice = ratable_invoice(10_000, period);
    // Refund pointing at an unknown payment
    let refund = RefundBuilder::new()
        .with_amount(usd(5_000))
        .processed_at(Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap())
        .build();

    let whole = DateRange::new(d(2024, 1, 1), d(2024, 1, 10)).unwrap();
    assert_eq!(
        recognized(&engine, std::slice::from_ref(&invoice), &[], &[refund], whole),
        10_000
    );
}

#[test]
fn test_deferred_balance_identity() {
    let engine = RecognitionEngine::new();
    let invoices = vec![
        ratable_invoice(
            100_000,
            DateRange::new(d(2024, 1, 1), d(2024, 12, 31)).unwrap(),
        ),
        ratable_invoice(
            37_731,
            DateRange::new(d(2024, 3, 10), d(2024, 8, 2)).unwrap(),
        ),
        ratable_invoice(5_000, DateRange::single_day(d(2024, 6, 1))),
    ];
    let total_invoiced: i64 = 100_000 + 37_731 + 5_000;

    for as_of in [
        d(2023, 12, 31),
        d(2024, 1, 1),
        d(2024, 4, 17),
        d(2024, 6, 1),
        d(2024, 9, 30),
        d(2025, 1, 1),
    ] {
        let recognized = engine
            .recognized_to_date(&invoices, &[], &[], as_of, Currency::USD)
            .unwrap();
        let deferred = engine
            .deferred_balance(&invoices, &[], &[], as_of, Currency::USD)
            .unwrap();
        assert_eq!(
            recognized.minor_units() + deferred.minor_units(),
            total_invoiced,
            "identity violated at {as_of}"
        );
    }
}

#[test]
fn test_deferred_balance_identity_excludes_voided_invoices() {
    let engine = RecognitionEngine::new();
    // Two $200 invoices over the same 20 days; one voided on day 10
    let period = DateRange::new(d(2024, 1, 1), d(2024, 1, 20)).unwrap();
    let invoices = vec![
        ratable_invoice(20_000, period),
        InvoiceBuilder::new()
            .with_line_item(LineItem::new(usd(20_000), period, RecognitionPolicy::Ratable))
            .voided(Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap())
            .build(),
    ];

    // Only the live invoice counts toward the ledger
    let as_of = d(2024, 1, 15);
    let to_date = engine
        .recognized_to_date(&invoices, &[], &[], as_of, Currency::USD)
        .unwrap();
    let deferred = engine
        .deferred_balance(&invoices, &[], &[], as_of, Currency::USD)
        .unwrap();
    assert_eq!(to_date.minor_units(), 15_000);
    assert_eq!(to_date.minor_units() + deferred.minor_units(), 20_000);

    // The voided invoice's frozen recognition still shows in window entries
    let whole = DateRange::new(d(2024, 1, 1), d(2024, 1, 20)).unwrap();
    assert_eq!(recognized(&engine, &invoices, &[], &[], whole), 30_000);
}

#[test]
fn test_extreme_amounts_recognize_without_loss() {
    let engine = RecognitionEngine::new();
    let invoice = ratable_invoice(i64::MAX, DateRange::single_day(d(2024, 6, 1)));

    let total = engine
        .recognized_to_date(&[invoice], &[], &[], d(2024, 6, 30), Currency::USD)
        .unwrap();
    assert_eq!(total.minor_units(), i64::MAX);
}

#[test]
fn test_entries_carry_clipped_periods_and_invoice_ids() {
    let engine = RecognitionEngine::new();
    let period = DateRange::new(d(2024, 1, 15), d(2024, 3, 15)).unwrap();
    let invoice = ratable_invoice(60_000, period);
    let id = invoice.id;

    let window = DateRange::month_of(d(2024, 2, 1));
    let entries = engine
        .entries_for_window(&[invoice], &[], &[], window)
        .unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].invoice_id, id);
    assert_eq!(entries[0].period, DateRange::month_of(d(2024, 2, 1)));
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any contiguous disjoint cover of the service period sums to the
        /// exact item amount (rounding closure).
        #[test]
        fn rounding_closure_over_disjoint_windows(
            amount in 1i64..10_000_000i64,
            period_days in 1i64..800i64,
            cut_a in 0i64..800i64,
            cut_b in 0i64..800i64,
        ) {
            let engine = RecognitionEngine::new();
            let start = d(2024, 1, 1);
            let end = start + Duration::days(period_days - 1);
            let invoice = ratable_invoice(amount, DateRange::new(start, end).unwrap());

            // Split the period at up to two interior cut points
            let mut cuts = vec![
                start + Duration::days(cut_a % period_days),
                start + Duration::days(cut_b % period_days),
            ];
            cuts.retain(|c| *c > start && *c <= end);
            cuts.sort();
            cuts.dedup();

            let mut boundaries = vec![start];
            boundaries.extend(cuts);
            boundaries.push(end + Duration::days(1));

            let mut total = 0i64;
            for pair in boundaries.windows(2) {
                let window = DateRange::new(pair[0], pair[1] - Duration::days(1)).unwrap();
                total += recognized(&engine, std::slice::from_ref(&invoice), &[], &[], window);
            }
            prop_assert_eq!(total, amount);
        }

        /// Cumulative recognition never decreases as the query day advances.
        #[test]
        fn recognition_is_monotonic(
            amount in 1i64..1_000_000i64,
            period_days in 1i64..400i64,
        ) {
            let engine = RecognitionEngine::new();
            let start = d(2024, 1, 1);
            let end = start + Duration::days(period_days - 1);
            let invoices = [ratable_invoice(amount, DateRange::new(start, end).unwrap())];

            let mut previous = 0i64;
            let mut as_of = start - Duration::days(1);
            while as_of <= end + Duration::days(2) {
                let current = engine
                    .recognized_to_date(&invoices, &[], &[], as_of, Currency::USD)
                    .unwrap()
                    .minor_units();
                prop_assert!(current >= previous);
                previous = current;
                as_of += Duration::days(7);
            }
        }
    }
}
