//! Pre-built Test Fixtures
//!
//! Ready-to-use test data shared across the workspace test suites.
//! Fixtures are consistent and predictable: the temporal epoch and FX
//! rates never change between tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

use core_kernel::{Currency, FxConverter, FxRate, Money};

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// $100.00
    pub fn usd_100() -> Money {
        Money::from_minor(10_000, Currency::USD)
    }

    /// €500.00
    pub fn eur_500() -> Money {
        Money::from_minor(50_000, Currency::EUR)
    }

    /// ¥10,000 (zero decimal places)
    pub fn jpy_10000() -> Money {
        Money::from_minor(10_000, Currency::JPY)
    }

    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// The reference instant most builders default to (Jan 15, 2024)
    pub fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    /// A "now" well inside January 2024, for month-to-date metrics
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 31, 18, 0, 0).unwrap()
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }
}

/// Fixture for FX conversion test data
pub struct FxFixtures;

impl FxFixtures {
    /// A converter quoting EUR, GBP, and JPY into USD at the epoch, with
    /// a staleness tolerance wide enough for month-long test windows
    pub fn usd_converter() -> FxConverter {
        let quoted_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        FxConverter::new()
            .with_staleness(chrono::Duration::days(365))
            .with_rate(FxRate {
                from: Currency::EUR,
                to: Currency::USD,
                rate: dec!(1.10),
                as_of: quoted_at,
            })
            .with_rate(FxRate {
                from: Currency::GBP,
                to: Currency::USD,
                rate: dec!(1.27),
                as_of: quoted_at,
            })
            .with_rate(FxRate {
                from: Currency::JPY,
                to: Currency::USD,
                rate: dec!(0.0068),
                as_of: quoted_at,
            })
    }
}
