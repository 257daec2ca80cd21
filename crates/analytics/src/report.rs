use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A standardized report of a simulated strategy's performance.
///
/// This struct is the final output of the `AnalyticsEngine` and serves as the
/// data transfer object for performance results throughout the entire system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    // I. Returns
    pub initial_equity: Decimal,
    pub final_equity: Decimal,
    /// `final_equity / initial_equity - 1`. `None` if the initial equity is zero.
    pub cumulative_return: Option<Decimal>,
    /// Annualized Sharpe ratio (risk-free rate of zero). `None` with fewer than
    /// two returns or zero volatility.
    pub sharpe_ratio: Option<Decimal>,

    // II. Risk and Drawdown
    pub max_drawdown: Decimal,
    pub max_drawdown_pct: Decimal,

    // III. Activity
    /// Number of rows in which exposure changed.
    pub total_trades: usize,
    /// Number of rows in the trajectory.
    pub periods: usize,
}

impl PerformanceReport {
    /// An empty report for the engine to fill in.
    pub fn new() -> Self {
        Self {
            initial_equity: Decimal::ZERO,
            final_equity: Decimal::ZERO,
            cumulative_return: None,
            sharpe_ratio: None,
            max_drawdown: Decimal::ZERO,
            max_drawdown_pct: Decimal::ZERO,
            total_trades: 0,
            periods: 0,
        }
    }
}

impl Default for PerformanceReport {
    fn default() -> Self {
        Self::new()
    }
}
