use crate::error::StrategyError;
use crate::rolling::RollingMean;
use crate::{SignalGenerator, SignalRecord};
use chrono::{DateTime, Utc};
use configuration::VolumeSpikeParams;
use core_types::{PriceSeries, SignalAction, StrategyId};
use rust_decimal::Decimal;
use serde::Serialize;

/// One bar of volume-spike output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeSpikeRecord {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    pub volume: Decimal,
    pub avg_volume: Option<Decimal>,
    /// `volume / avg_volume`; `None` during warm-up or when the average is zero.
    pub volume_ratio: Option<Decimal>,
    /// Fractional close-to-close change; `None` on the first bar.
    pub price_change: Option<Decimal>,
    /// `Buy` on a confirmed spike, `Hold` otherwise. Never `Sell`.
    pub signal: Option<SignalAction>,
}

impl SignalRecord for VolumeSpikeRecord {
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

/// Buys when volume spikes above its trailing average on an up bar.
#[derive(Debug, Clone)]
pub struct VolumeSpike {
    params: VolumeSpikeParams,
}

impl VolumeSpike {
    /// Creates a new `VolumeSpike`. Fails unless `window > 0` and `threshold > 0`.
    pub fn new(params: VolumeSpikeParams) -> Result<Self, StrategyError> {
        params.validate().map_err(StrategyError::InvalidParameters)?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &VolumeSpikeParams {
        &self.params
    }
}

impl SignalGenerator for VolumeSpike {
    type Record = VolumeSpikeRecord;

    fn id(&self) -> StrategyId {
        StrategyId::VolumeSpike
    }

    fn generate(&self, series: &PriceSeries) -> Result<Vec<VolumeSpikeRecord>, StrategyError> {
        let mut avg = RollingMean::new(self.params.window)?;
        let mut prev_close: Option<Decimal> = None;
        let mut records = Vec::with_capacity(series.len());

        for bar in series.bars() {
            let avg_volume = avg.next(bar.volume);

            let volume_ratio = match avg_volume {
                Some(a) if !a.is_zero() => Some(bar.volume.checked_div(a).ok_or_else(|| {
                    StrategyError::IndicatorError(format!(
                        "volume ratio overflowed at {}",
                        bar.timestamp
                    ))
                })?),
                _ => None,
            };

            // Prices are validated positive, so the previous close is never zero.
            let price_change = prev_close.map(|prev| bar.close / prev - Decimal::ONE);
            prev_close = Some(bar.close);

            let signal = match (volume_ratio, price_change) {
                (Some(ratio), Some(change)) if ratio > self.params.threshold && change > Decimal::ZERO => {
                    Some(SignalAction::Buy)
                }
                (Some(_), Some(_)) => Some(SignalAction::Hold),
                _ => None,
            };

            records.push(VolumeSpikeRecord {
                timestamp: bar.timestamp,
                price: bar.close,
                volume: bar.volume,
                avg_volume,
                volume_ratio,
                price_change,
                signal,
            });
        }

        tracing::debug!(
            symbol = series.symbol(),
            window = self.params.window,
            spikes = records.iter().filter(|r| r.signal == Some(SignalAction::Buy)).count(),
            "VolumeSpike: generated signals"
        );

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::series_from_closes_and_volumes;
    use rust_decimal_macros::dec;

    fn generator(window: usize, threshold: Decimal) -> VolumeSpike {
        VolumeSpike::new(VolumeSpikeParams { window, threshold }).unwrap()
    }

    fn decimals(values: &[i64]) -> Vec<Decimal> {
        values.iter().map(|&v| Decimal::from(v)).collect()
    }

    #[test]
    fn rejects_non_positive_threshold() {
        let err = VolumeSpike::new(VolumeSpikeParams { window: 3, threshold: dec!(0) }).unwrap_err();
        assert!(matches!(err, StrategyError::InvalidParameters(_)));
    }

    #[test]
    fn spike_on_up_bar_buys() {
        let closes = decimals(&[10, 10, 10, 11]);
        let volumes = decimals(&[100, 100, 100, 700]);
        let series = series_from_closes_and_volumes(&closes, &volumes);
        let records = generator(3, dec!(2)).generate(&series).unwrap();

        // Window [100, 100, 700] => avg 300, ratio 7/3.
        let last = &records[3];
        assert_eq!(last.avg_volume, Some(dec!(300)));
        assert_eq!(last.volume_ratio.map(|r| r.round_dp(4)), Some(dec!(2.3333)));
        assert_eq!(last.price_change, Some(dec!(0.1)));
        assert_eq!(last.signal, Some(SignalAction::Buy));
    }

    #[test]
    fn spike_on_down_bar_does_not_sell() {
        let closes = decimals(&[10, 10, 10, 9]);
        let volumes = decimals(&[100, 100, 100, 700]);
        let series = series_from_closes_and_volumes(&closes, &volumes);
        let records = generator(3, dec!(2)).generate(&series).unwrap();

        assert_eq!(records[3].signal, Some(SignalAction::Hold));
    }

    #[test]
    fn warm_up_and_zero_average_are_unavailable() {
        let closes = decimals(&[10, 11, 12, 13, 14]);
        let volumes = decimals(&[0, 0, 0, 0, 60]);
        let series = series_from_closes_and_volumes(&closes, &volumes);
        let records = generator(3, dec!(2)).generate(&series).unwrap();

        assert_eq!(records[0].price_change, None);
        assert!(records[..2].iter().all(|r| r.avg_volume.is_none() && r.signal.is_none()));
        // Average is zero: ratio is unavailable, not infinite.
        assert_eq!(records[2].avg_volume, Some(dec!(0)));
        assert_eq!(records[2].volume_ratio, None);
        assert_eq!(records[3].signal, None);
        assert_eq!(records[4].volume_ratio, Some(dec!(3)));
        assert_eq!(records[4].signal, Some(SignalAction::Buy));
    }

    #[test]
    fn never_emits_a_sell() {
        let closes = decimals(&[50, 40, 60, 30, 70, 20, 80, 10, 90, 5, 95, 4]);
        let volumes = decimals(&[1, 900, 2, 800, 3, 700, 4, 600, 5, 500, 6, 400]);
        let series = series_from_closes_and_volumes(&closes, &volumes);

        for window in 1..=4 {
            for threshold in [dec!(0.5), dec!(1), dec!(1.5), dec!(3)] {
                let records = generator(window, threshold).generate(&series).unwrap();
                assert!(records.iter().all(|r| r.signal != Some(SignalAction::Sell)));
            }
        }
    }
}
