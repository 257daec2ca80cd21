use crate::error::BacktestError;
use analytics::{AnalyticsEngine, PerformanceReport};
use configuration::{BacktestSettings, Strategies};
use core_types::{PortfolioState, PriceSeries, StrategyId};
use rust_decimal::Decimal;
use serde::Serialize;
use strategies::{generate_signals, SignalFrame, SignalRecord};

pub mod error;
pub mod ledger;

pub use ledger::Ledger;

/// The simulated trajectory of one strategy together with its metrics.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestOutcome {
    pub strategy: StrategyId,
    pub portfolio: Vec<PortfolioState>,
    pub report: PerformanceReport,
}

/// The main backtesting engine.
///
/// Holds one unit of exposure per signal direction: the signal of each row is
/// the target exposure (`Buy` = +1, `Hold` = 0, `Sell` = -1) and every change in
/// exposure is settled against cash at that row's price.
#[derive(Debug, Clone)]
pub struct Backtester {
    initial_capital: Decimal,
    analytics_engine: AnalyticsEngine,
}

impl Backtester {
    /// Constructs a new `Backtester`. The capital must be strictly positive.
    pub fn new(initial_capital: Decimal, analytics_engine: AnalyticsEngine) -> Result<Self, BacktestError> {
        if initial_capital <= Decimal::ZERO {
            return Err(BacktestError::InvalidParameter(format!(
                "initial_capital must be positive, got {initial_capital}"
            )));
        }
        Ok(Self {
            initial_capital,
            analytics_engine,
        })
    }

    /// Builds a `Backtester` from the `[backtest]` section of the config.
    pub fn from_settings(settings: &BacktestSettings) -> Result<Self, BacktestError> {
        let analytics_engine = AnalyticsEngine::new(settings.trading_periods_per_year)?;
        Self::new(settings.initial_capital, analytics_engine)
    }

    /// Replays a signal series and returns one `PortfolioState` per row.
    ///
    /// A row whose signal is not yet available is treated as flat (exposure 0).
    /// The input is only read, so running it twice yields identical trajectories.
    pub fn simulate<I, R>(&self, records: I) -> Result<Vec<PortfolioState>, BacktestError>
    where
        I: IntoIterator<Item = R>,
        R: SignalRecord,
    {
        let (ledger, portfolio) = records.into_iter().try_fold(
            (Ledger::new(self.initial_capital), Vec::new()),
            |(ledger, mut portfolio), record| {
                let exposure = record
                    .signal()
                    .map(|action| action.exposure())
                    .unwrap_or(Decimal::ZERO);
                let (next, state) = ledger.apply(record.timestamp(), record.price(), exposure)?;
                portfolio.push(state);
                Ok::<_, BacktestError>((next, portfolio))
            },
        )?;

        if portfolio.is_empty() {
            return Err(BacktestError::DataUnavailable);
        }

        tracing::debug!(
            rows = portfolio.len(),
            final_cash = %ledger.cash,
            final_equity = ?ledger.total_equity,
            "Simulation complete."
        );
        Ok(portfolio)
    }

    /// Simulates the records, then calculates the performance report over the result.
    pub fn evaluate<I, R>(&self, strategy: StrategyId, records: I) -> Result<BacktestOutcome, BacktestError>
    where
        I: IntoIterator<Item = R>,
        R: SignalRecord,
    {
        let portfolio = self.simulate(records)?;
        let report = self.analytics_engine.calculate(&portfolio)?;
        Ok(BacktestOutcome {
            strategy,
            portfolio,
            report,
        })
    }

    /// Backtests an already generated frame.
    pub fn evaluate_frame(&self, frame: &SignalFrame) -> Result<BacktestOutcome, BacktestError> {
        self.evaluate(frame.strategy_id(), frame.records())
    }

    /// Generates the signals of one strategy over `series` and backtests them.
    pub fn run(
        &self,
        strategy: StrategyId,
        params: &Strategies,
        series: &PriceSeries,
    ) -> Result<(SignalFrame, BacktestOutcome), BacktestError> {
        tracing::info!(%strategy, symbol = series.symbol(), bars = series.len(), "Running backtest");

        // --- 1. SIGNAL GENERATION ---
        let frame = generate_signals(strategy, params, series)?;

        // --- 2. SIMULATION AND METRICS ---
        let outcome = self.evaluate_frame(&frame)?;

        tracing::info!(
            %strategy,
            cumulative_return = ?outcome.report.cumulative_return,
            sharpe_ratio = ?outcome.report.sharpe_ratio,
            trades = outcome.report.total_trades,
            "Backtest finished"
        );
        Ok((frame, outcome))
    }
}
