use alerter::SignalAlert;
use backtester::error::BacktestError;
use backtester::{BacktestOutcome, Backtester};
use chrono::{DateTime, Utc};
use configuration::Strategies;
use core_types::{PriceSeries, SignalAction, StrategyId};
use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::Serialize;
use strategies::SignalFrame;

/// One strategy's signals together with their backtest.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyRun {
    pub frame: SignalFrame,
    pub outcome: BacktestOutcome,
}

/// Everything the `analyze` command reports for one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub bars: usize,
    pub runs: Vec<StrategyRun>,
}

/// One row of the combined "Recent Signals" view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentSignal {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    /// The crossover's exposure change: +1 on a bullish cross, -1 on a bearish one.
    pub ma_position: Option<Decimal>,
    pub rsi_signal: Option<SignalAction>,
    pub volume_signal: Option<SignalAction>,
}

/// Runs every enabled strategy over `series` in parallel and backtests each one.
///
/// Runs come back in the order the strategies are listed in `params.enabled`.
pub fn analyze_series(
    backtester: &Backtester,
    params: &Strategies,
    series: &PriceSeries,
) -> Result<AnalysisReport, BacktestError> {
    tracing::info!(
        symbol = series.symbol(),
        strategies = params.enabled.len(),
        threads = rayon::current_num_threads(),
        "Running strategies"
    );

    let runs = params
        .enabled
        .par_iter()
        .map(|&id| {
            let (frame, outcome) = backtester.run(id, params, series)?;
            Ok::<_, BacktestError>(StrategyRun { frame, outcome })
        })
        .collect::<Result<Vec<_>, BacktestError>>()?;

    Ok(AnalysisReport {
        symbol: series.symbol().to_string(),
        bars: series.len(),
        runs,
    })
}

impl AnalysisReport {
    pub fn run(&self, id: StrategyId) -> Option<&StrategyRun> {
        self.runs.iter().find(|run| run.frame.strategy_id() == id)
    }

    /// The last `tail` bars with the three generators' columns side by side.
    ///
    /// A column is `None` when its strategy is disabled or still warming up.
    pub fn recent_signals(&self, tail: usize) -> Vec<RecentSignal> {
        let start = self.bars.saturating_sub(tail);
        let Some(reference) = self.runs.first() else {
            return Vec::new();
        };

        reference.frame.records()[start..]
            .iter()
            .enumerate()
            .map(|(offset, record)| {
                let idx = start + offset;
                let mut row = RecentSignal {
                    timestamp: record.timestamp(),
                    price: record.price(),
                    ma_position: None,
                    rsi_signal: None,
                    volume_signal: None,
                };
                for run in &self.runs {
                    match &run.frame {
                        SignalFrame::MACrossover(records) => {
                            row.ma_position = records.get(idx).and_then(|r| r.position);
                        }
                        SignalFrame::Rsi(records) => {
                            row.rsi_signal = records.get(idx).and_then(|r| r.signal);
                        }
                        SignalFrame::VolumeSpike(records) => {
                            row.volume_signal = records.get(idx).and_then(|r| r.signal);
                        }
                    }
                }
                row
            })
            .collect()
    }

    /// Alerts for whatever triggered on the most recent bar.
    pub fn latest_alerts(&self) -> Vec<SignalAlert> {
        self.runs
            .iter()
            .filter_map(|run| {
                let latest = run.frame.latest()?;
                SignalAlert::from_record(&self.symbol, run.frame.strategy_id(), latest)
            })
            .collect()
    }
}
