//! # SignalSprint Strategy Library
//!
//! This crate contains the signal generators for the SignalSprint system. Each
//! generator turns a `PriceSeries` into one record per bar, carrying the close
//! price, a trading intent, and the indicator values that produced it.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** Generators have no knowledge of data providers, alerting or
//!   the simulator. They depend only on `core-types` and `configuration`.
//! - **Explicit Warm-up:** Indicator fields are `Option`s. A value that cannot be
//!   computed yet (because its lookback window is not full) is `None`, never `0`.
//! - **Uniform Contract:** Every record type implements `SignalRecord`, which is
//!   all the backtester needs. Generator-specific columns stay on the concrete types.
//!
//! ## Public API
//!
//! - `SignalGenerator`: The trait all generators implement.
//! - `SignalRecord`: The `{price, signal}` contract consumed by the backtester.
//! - `generate_signals` / `SignalFrame`: Run a generator selected by `StrategyId`.
//! - The concrete generators: `MACrossover`, `RsiSignal`, `VolumeSpike`.

pub mod error;
pub mod factory;
pub mod ma_crossover;
pub mod rolling;
pub mod rsi;
pub mod volume_spike;

pub use error::StrategyError;
pub use factory::{generate_signals, SignalFrame};
pub use ma_crossover::{MACrossover, MACrossoverRecord};
pub use rolling::RollingMean;
pub use rsi::{RsiRecord, RsiSignal};
pub use volume_spike::{VolumeSpike, VolumeSpikeRecord};

// Re-export StrategyId from core_types
pub use core_types::enums::StrategyId;

use chrono::{DateTime, Utc};
use core_types::{PriceSeries, SignalAction};
use rust_decimal::Decimal;

/// The per-bar contract shared by every generator's output.
///
/// The backtester depends only on this trait, so it can simulate any generator
/// without knowing which indicator columns it carries.
pub trait SignalRecord {
    fn timestamp(&self) -> DateTime<Utc>;

    /// The close price of the bar this record was derived from.
    fn price(&self) -> Decimal;

    /// The trading intent, or `None` while the generator is still warming up.
    fn signal(&self) -> Option<SignalAction>;

    /// The action an alert should announce for this bar, if any.
    ///
    /// By default any non-neutral signal triggers. Generators whose signal is a
    /// held state rather than an event (the crossover) override this.
    fn trigger(&self) -> Option<SignalAction> {
        self.signal().filter(|action| *action != SignalAction::Hold)
    }
}

impl<T: SignalRecord + ?Sized> SignalRecord for &T {
    fn timestamp(&self) -> DateTime<Utc> {
        (**self).timestamp()
    }

    fn price(&self) -> Decimal {
        (**self).price()
    }

    fn signal(&self) -> Option<SignalAction> {
        (**self).signal()
    }

    fn trigger(&self) -> Option<SignalAction> {
        (**self).trigger()
    }
}

/// The core trait that all signal generators implement.
///
/// Generators are stateless between calls: `generate` builds any rolling state it
/// needs locally, so one generator can be shared across threads and applied to
/// many series. The `Send + Sync` bounds let the CLI run generators in parallel.
pub trait SignalGenerator: Send + Sync {
    /// The record type produced for each bar.
    type Record: SignalRecord + Send;

    fn id(&self) -> StrategyId;

    /// Produces exactly one record per bar of `series`, in the same order.
    fn generate(&self, series: &PriceSeries) -> Result<Vec<Self::Record>, StrategyError>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{Duration, TimeZone, Utc};
    use core_types::{Bar, PriceSeries};
    use rust_decimal::Decimal;

    /// Builds a daily series from closes, with a constant volume of 1000.
    pub fn series_from_closes(closes: &[Decimal]) -> PriceSeries {
        let volumes = vec![Decimal::from(1000); closes.len()];
        series_from_closes_and_volumes(closes, &volumes)
    }

    pub fn series_from_closes_and_volumes(closes: &[Decimal], volumes: &[Decimal]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, &volume))| Bar {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume,
            })
            .collect();
        PriceSeries::new("TEST", bars).expect("test series is valid")
    }
}
