use crate::error::StrategyError;
use crate::rolling::RollingMean;
use crate::{SignalGenerator, SignalRecord};
use chrono::{DateTime, Utc};
use configuration::RsiParams;
use core_types::{PriceSeries, SignalAction, StrategyId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// The RSI reported when the window holds no price movement at all.
pub const NEUTRAL_RSI: Decimal = dec!(50);

/// One bar of RSI output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsiRecord {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    pub rsi: Option<Decimal>,
    /// `Buy` when oversold, `Sell` when overbought, `Hold` in between.
    pub signal: Option<SignalAction>,
}

impl SignalRecord for RsiRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn price(&self) -> Decimal {
        self.price
    }

    fn signal(&self) -> Option<SignalAction> {
        self.signal
    }
}

/// The RSI overbought/oversold generator.
///
/// Average gain and loss are simple trailing means over `period` close-to-close
/// changes, so the first RSI value appears at index `period`.
#[derive(Debug, Clone)]
pub struct RsiSignal {
    params: RsiParams,
}

impl RsiSignal {
    /// Creates a new `RsiSignal`. Fails unless `period > 0` and `0 <= lower < upper <= 100`.
    pub fn new(params: RsiParams) -> Result<Self, StrategyError> {
        params.validate().map_err(StrategyError::InvalidParameters)?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &RsiParams {
        &self.params
    }

    fn classify(&self, rsi: Decimal) -> SignalAction {
        if rsi > self.params.upper {
            SignalAction::Sell
        } else if rsi < self.params.lower {
            SignalAction::Buy
        } else {
            SignalAction::Hold
        }
    }
}

/// Computes RSI from an average gain and an average loss.
///
/// Zero loss is handled by convention rather than division: with some gain the
/// market is fully overbought (100); with no movement at all it is neutral (50).
pub fn relative_strength_index(avg_gain: Decimal, avg_loss: Decimal) -> Result<Decimal, StrategyError> {
    if avg_loss.is_zero() {
        return Ok(if avg_gain.is_zero() {
            NEUTRAL_RSI
        } else {
            Decimal::ONE_HUNDRED
        });
    }

    // Same value as 100 - 100 / (1 + gain / loss), without the unbounded ratio.
    let total = avg_gain
        .checked_add(avg_loss)
        .ok_or_else(|| StrategyError::IndicatorError("RSI gain + loss overflowed".to_string()))?;
    Decimal::ONE_HUNDRED
        .checked_mul(avg_gain)
        .and_then(|scaled| scaled.checked_div(total))
        .ok_or_else(|| {
            StrategyError::IndicatorError(format!(
                "RSI could not be computed for gain {avg_gain} and loss {avg_loss}"
            ))
        })
}

impl SignalGenerator for RsiSignal {
    type Record = RsiRecord;

    fn id(&self) -> StrategyId {
        StrategyId::Rsi
    }

    fn generate(&self, series: &PriceSeries) -> Result<Vec<RsiRecord>, StrategyError> {
        let mut gains = RollingMean::new(self.params.period)?;
        let mut losses = RollingMean::new(self.params.period)?;
        let mut prev_close: Option<Decimal> = None;
        let mut records = Vec::with_capacity(series.len());

        for bar in series.bars() {
            let rsi = match prev_close {
                // No delta exists for the first bar.
                None => None,
                Some(prev) => {
                    let delta = bar.close - prev;
                    let gain = gains.next(delta.max(Decimal::ZERO));
                    let loss = losses.next((-delta).max(Decimal::ZERO));
                    match (gain, loss) {
                        (Some(g), Some(l)) => Some(relative_strength_index(g, l)?),
                        _ => None,
                    }
                }
            };
            prev_close = Some(bar.close);

            records.push(RsiRecord {
                timestamp: bar.timestamp,
                price: bar.close,
                rsi,
                signal: rsi.map(|value| self.classify(value)),
            });
        }

        tracing::debug!(
            symbol = series.symbol(),
            period = self.params.period,
            last_rsi = ?records.last().and_then(|r| r.rsi),
            "RsiSignal: generated signals"
        );

        Ok(records)
    }
}
