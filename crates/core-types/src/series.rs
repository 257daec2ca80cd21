use crate::error::CoreError;
use crate::structs::Bar;
use rust_decimal::Decimal;
use serde::Serialize;

/// A validated, chronologically ordered OHLCV table for one symbol.
///
/// Construction is the only place validation happens; every consumer downstream
/// can rely on the series being non-empty, strictly increasing in time, and
/// holding positive prices with non-negative volume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Validates `bars` and wraps them into a `PriceSeries`.
    ///
    /// Fails with `CoreError::DataUnavailable` when the series is empty, holds a
    /// non-positive price or a negative volume, or is not strictly increasing in time.
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, CoreError> {
        let symbol = symbol.into();

        if bars.is_empty() {
            return Err(CoreError::DataUnavailable(format!(
                "no bars returned for {symbol}"
            )));
        }

        for (idx, bar) in bars.iter().enumerate() {
            let prices = [bar.open, bar.high, bar.low, bar.close];
            if prices.iter().any(|p| *p <= Decimal::ZERO) {
                return Err(CoreError::DataUnavailable(format!(
                    "{symbol}: non-positive price in bar {idx} at {}",
                    bar.timestamp
                )));
            }
            if bar.volume < Decimal::ZERO {
                return Err(CoreError::DataUnavailable(format!(
                    "{symbol}: negative volume in bar {idx} at {}",
                    bar.timestamp
                )));
            }
        }

        if let Some(pair) = bars.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(CoreError::DataUnavailable(format!(
                "{symbol}: timestamps are not strictly increasing ({} followed by {})",
                pair[0].timestamp, pair[1].timestamp
            )));
        }

        tracing::debug!(symbol = %symbol, bars = bars.len(), "price series validated");

        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always `false` for a constructed series; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> &Bar {
        &self.bars[0]
    }

    pub fn last(&self) -> &Bar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn closes(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.bars.iter().map(|b| b.close)
    }
}
