use crate::error::StrategyError;
use crate::ma_crossover::{MACrossover, MACrossoverRecord};
use crate::rsi::{RsiRecord, RsiSignal};
use crate::volume_spike::{VolumeSpike, VolumeSpikeRecord};
use crate::{SignalGenerator, SignalRecord};
use configuration::Strategies;
use core_types::enums::StrategyId;
use core_types::PriceSeries;
use serde::Serialize;

/// The output of any one generator, tagged by which generator produced it.
///
/// Serializes as `{"strategy": "rsi", "records": [...]}` so a presentation layer
/// can tell the column sets apart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "strategy", content = "records", rename_all = "snake_case")]
pub enum SignalFrame {
    #[serde(rename = "ma_crossover")]
    MACrossover(Vec<MACrossoverRecord>),
    Rsi(Vec<RsiRecord>),
    VolumeSpike(Vec<VolumeSpikeRecord>),
}

impl SignalFrame {
    pub fn strategy_id(&self) -> StrategyId {
        match self {
            SignalFrame::MACrossover(_) => StrategyId::MACrossover,
            SignalFrame::Rsi(_) => StrategyId::Rsi,
            SignalFrame::VolumeSpike(_) => StrategyId::VolumeSpike,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SignalFrame::MACrossover(r) => r.len(),
            SignalFrame::Rsi(r) => r.len(),
            SignalFrame::VolumeSpike(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Views every row through the shared `SignalRecord` contract.
    pub fn records(&self) -> Vec<&dyn SignalRecord> {
        match self {
            SignalFrame::MACrossover(r) => r.iter().map(|x| x as &dyn SignalRecord).collect(),
            SignalFrame::Rsi(r) => r.iter().map(|x| x as &dyn SignalRecord).collect(),
            SignalFrame::VolumeSpike(r) => r.iter().map(|x| x as &dyn SignalRecord).collect(),
        }
    }

    /// The last row, if the frame has any.
    pub fn latest(&self) -> Option<&dyn SignalRecord> {
        match self {
            SignalFrame::MACrossover(r) => r.last().map(|x| x as &dyn SignalRecord),
            SignalFrame::Rsi(r) => r.last().map(|x| x as &dyn SignalRecord),
            SignalFrame::VolumeSpike(r) => r.last().map(|x| x as &dyn SignalRecord),
        }
    }
}

/// Builds the generator selected by `id` from its configured parameters and runs
/// it over `series`.
///
/// Parameter validation happens before any bar is read.
pub fn generate_signals(
    id: StrategyId,
    params: &Strategies,
    series: &PriceSeries,
) -> Result<SignalFrame, StrategyError> {
    // A complete match: adding a StrategyId without a generator fails to compile.
    let frame = match id {
        StrategyId::MACrossover => {
            let generator = MACrossover::new(params.ma_crossover.clone())?;
            SignalFrame::MACrossover(generator.generate(series)?)
        }
        StrategyId::Rsi => {
            let generator = RsiSignal::new(params.rsi.clone())?;
            SignalFrame::Rsi(generator.generate(series)?)
        }
        StrategyId::VolumeSpike => {
            let generator = VolumeSpike::new(params.volume_spike.clone())?;
            SignalFrame::VolumeSpike(generator.generate(series)?)
        }
    };

    tracing::debug!(strategy = %id, rows = frame.len(), "signal frame generated");
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::series_from_closes;
    use core_types::SignalAction;
    use rust_decimal::Decimal;

    #[test]
    fn every_strategy_yields_one_row_per_bar() {
        let closes: Vec<Decimal> = (0..60).map(|i| Decimal::from(100 + (i * 7) % 11)).collect();
        let series = series_from_closes(&closes);
        let params = Strategies::default();

        for id in StrategyId::ALL {
            let frame = generate_signals(id, &params, &series).unwrap();
            assert_eq!(frame.strategy_id(), id);
            assert_eq!(frame.len(), series.len());
            let records = frame.records();
            for (record, bar) in records.iter().zip(series.bars()) {
                assert_eq!(record.timestamp(), bar.timestamp);
                assert_eq!(record.price(), bar.close);
            }
        }
    }

    #[test]
    fn invalid_parameters_fail_before_generation() {
        let series = series_from_closes(&[Decimal::from(10)]);
        let mut params = Strategies::default();
        params.ma_crossover.long_window = params.ma_crossover.short_window;

        let err = generate_signals(StrategyId::MACrossover, &params, &series).unwrap_err();
        assert!(matches!(err, StrategyError::InvalidParameters(_)));
    }

    #[test]
    fn latest_exposes_the_last_row() {
        let closes: Vec<Decimal> = (1..=20).map(Decimal::from).collect();
        let series = series_from_closes(&closes);
        let mut params = Strategies::default();
        params.rsi.period = 3;

        let frame = generate_signals(StrategyId::Rsi, &params, &series).unwrap();
        let latest = frame.latest().unwrap();
        assert_eq!(latest.price(), Decimal::from(20));
        assert_eq!(latest.signal(), Some(SignalAction::Sell));
        assert_eq!(latest.trigger(), Some(SignalAction::Sell));
    }

    #[test]
    fn frame_serializes_with_strategy_tag() {
        let series = series_from_closes(&[Decimal::from(10), Decimal::from(11)]);
        let frame = generate_signals(StrategyId::VolumeSpike, &Strategies::default(), &series).unwrap();
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["strategy"], "volume_spike");
        assert_eq!(json["records"].as_array().unwrap().len(), 2);
        assert!(json["records"][0]["avg_volume"].is_null());
    }
}
