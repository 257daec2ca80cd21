use crate::error::StrategyError;
use crate::rolling::RollingMean;
use crate::{SignalGenerator, SignalRecord};
use chrono::{DateTime, Utc};
use configuration::MACrossoverParams;
use core_types::{PriceSeries, SignalAction, StrategyId};
use rust_decimal::Decimal;
use serde::Serialize;

/// One bar of moving-average crossover output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MACrossoverRecord {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    pub short_mavg: Option<Decimal>,
    pub long_mavg: Option<Decimal>,
    /// `Buy` while the short mean is above the long mean, `Hold` otherwise.
    pub signal: Option<SignalAction>,
    /// Change in signal exposure from the previous bar: `+1` on a bullish cross,
    /// `-1` on a bearish cross, `0` otherwise.
    pub position: Option<Decimal>,
}

impl SignalRecord for MACrossoverRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn price(&self) -> Decimal {
        self.price
    }

    fn signal(&self) -> Option<SignalAction> {
        self.signal
    }

    /// Only the cross itself is an event worth announcing.
    fn trigger(&self) -> Option<SignalAction> {
        self.position
            .map(SignalAction::from_sign)
            .filter(|action| *action != SignalAction::Hold)
    }
}

/// The dual simple-moving-average crossover generator.
#[derive(Debug, Clone)]
pub struct MACrossover {
    params: MACrossoverParams,
}

impl MACrossover {
    /// Creates a new `MACrossover` instance with the given parameters.
    ///
    /// Fails unless `0 < short_window < long_window`.
    pub fn new(params: MACrossoverParams) -> Result<Self, StrategyError> {
        params.validate().map_err(StrategyError::InvalidParameters)?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &MACrossoverParams {
        &self.params
    }
}

impl SignalGenerator for MACrossover {
    type Record = MACrossoverRecord;

    fn id(&self) -> StrategyId {
        StrategyId::MACrossover
    }

    fn generate(&self, series: &PriceSeries) -> Result<Vec<MACrossoverRecord>, StrategyError> {
        let mut short = RollingMean::new(self.params.short_window)?;
        let mut long = RollingMean::new(self.params.long_window)?;
        let mut prev_signal: Option<SignalAction> = None;

        let records: Vec<MACrossoverRecord> = series
            .bars()
            .iter()
            .map(|bar| {
                let short_mavg = short.next(bar.close);
                let long_mavg = long.next(bar.close);

                // The long window always fills last, so it alone gates the signal.
                let signal = match (short_mavg, long_mavg) {
                    (Some(s), Some(l)) if s > l => Some(SignalAction::Buy),
                    (Some(_), Some(_)) => Some(SignalAction::Hold),
                    _ => None,
                };

                let position = match (signal, prev_signal) {
                    (Some(current), Some(previous)) => {
                        Some(current.exposure() - previous.exposure())
                    }
                    _ => None,
                };
                prev_signal = signal;

                MACrossoverRecord {
                    timestamp: bar.timestamp,
                    price: bar.close,
                    short_mavg,
                    long_mavg,
                    signal,
                    position,
                }
            })
            .collect();

        tracing::debug!(
            symbol = series.symbol(),
            short_window = self.params.short_window,
            long_window = self.params.long_window,
            crosses = records.iter().filter(|r| r.trigger().is_some()).count(),
            "MACrossover: generated signals"
        );

        Ok(records)
    }
}
