use crate::error::AnalyticsError;
use crate::report::PerformanceReport;
use core_types::PortfolioState;
use rust_decimal::{Decimal, MathematicalOps};

/// Trading periods in a year of daily bars.
pub const DEFAULT_TRADING_PERIODS_PER_YEAR: u32 = 252;

/// A stateless calculator for deriving performance metrics from a portfolio trajectory.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    trading_periods_per_year: u32,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self {
            trading_periods_per_year: DEFAULT_TRADING_PERIODS_PER_YEAR,
        }
    }
}

impl AnalyticsEngine {
    /// Creates an engine that annualizes with `trading_periods_per_year`
    /// (252 for daily bars, 52 for weekly, and so on).
    pub fn new(trading_periods_per_year: u32) -> Result<Self, AnalyticsError> {
        if trading_periods_per_year == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "trading_periods_per_year must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            trading_periods_per_year,
        })
    }

    pub fn trading_periods_per_year(&self) -> u32 {
        self.trading_periods_per_year
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `portfolio` - The simulated trajectory, one row per bar.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `PerformanceReport`, or `InsufficientData` if the
    /// trajectory is empty. Metrics that are individually undefined are `None`.
    pub fn calculate(&self, portfolio: &[PortfolioState]) -> Result<PerformanceReport, AnalyticsError> {
        let (first, last) = match (portfolio.first(), portfolio.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(AnalyticsError::InsufficientData(
                    "portfolio trajectory is empty".to_string(),
                ));
            }
        };

        let mut report = PerformanceReport::new();
        report.periods = portfolio.len();
        report.initial_equity = first.total_equity;
        report.final_equity = last.total_equity;
        report.total_trades = portfolio
            .iter()
            .filter(|s| !s.position_delta.is_zero())
            .count();

        report.cumulative_return = match self.cumulative_return(portfolio) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "cumulative return is undefined");
                None
            }
        };

        report.sharpe_ratio = match self.sharpe_ratio(portfolio) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "sharpe ratio is undefined");
                None
            }
        };

        self.calculate_drawdown(portfolio, &mut report);

        tracing::debug!(?report, "performance report calculated");
        Ok(report)
    }

    /// Annualized Sharpe ratio of the per-row returns, assuming a zero risk-free rate.
    ///
    /// The first row has no return and is skipped, as is any row whose previous
    /// equity was zero. Uses the sample standard deviation. Fails with
    /// `InsufficientData` when fewer than two returns exist or they do not vary.
    pub fn sharpe_ratio(&self, portfolio: &[PortfolioState]) -> Result<Decimal, AnalyticsError> {
        let returns: Vec<Decimal> = portfolio.iter().filter_map(|s| s.returns).collect();

        if returns.len() < 2 {
            return Err(AnalyticsError::InsufficientData(format!(
                "sharpe ratio needs at least 2 returns, got {}",
                returns.len()
            )));
        }

        let overflow = |step: &str| AnalyticsError::InternalError(format!("sharpe ratio overflowed computing the {step}"));

        let count = Decimal::from(returns.len());
        let mean = returns
            .iter()
            .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(*r))
            .and_then(|sum| sum.checked_div(count))
            .ok_or_else(|| overflow("mean"))?;

        let variance = returns
            .iter()
            .try_fold(Decimal::ZERO, |acc, r| {
                let deviation = r.checked_sub(mean)?;
                acc.checked_add(deviation.checked_mul(deviation)?)
            })
            .and_then(|sum| sum.checked_div(count - Decimal::ONE))
            .ok_or_else(|| overflow("variance"))?;

        if variance.is_zero() {
            return Err(AnalyticsError::InsufficientData(
                "returns have zero volatility".to_string(),
            ));
        }

        let std_dev = variance.sqrt().ok_or_else(|| {
            AnalyticsError::InternalError("Failed to calculate square root for variance".to_string())
        })?;
        let annualization = Decimal::from(self.trading_periods_per_year)
            .sqrt()
            .ok_or_else(|| {
                AnalyticsError::InternalError("Failed to calculate annualization factor".to_string())
            })?;

        annualization
            .checked_mul(mean)
            .and_then(|scaled| scaled.checked_div(std_dev))
            .ok_or_else(|| overflow("ratio"))
    }

    /// `total_equity[last] / total_equity[first] - 1`.
    pub fn cumulative_return(&self, portfolio: &[PortfolioState]) -> Result<Decimal, AnalyticsError> {
        let (first, last) = match (portfolio.first(), portfolio.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(AnalyticsError::InsufficientData(
                    "portfolio trajectory is empty".to_string(),
                ));
            }
        };

        if first.total_equity.is_zero() {
            return Err(AnalyticsError::DivisionByZero("cumulative_return".to_string()));
        }

        last.total_equity
            .checked_div(first.total_equity)
            .map(|growth| growth - Decimal::ONE)
            .ok_or_else(|| AnalyticsError::InternalError("cumulative return overflowed".to_string()))
    }

    /// Calculates maximum peak-to-trough drawdown of total equity.
    fn calculate_drawdown(&self, portfolio: &[PortfolioState], report: &mut PerformanceReport) {
        let mut peak_equity = portfolio[0].total_equity;
        let mut max_drawdown = Decimal::ZERO;
        let mut max_drawdown_pct = Decimal::ZERO;

        for state in portfolio {
            if state.total_equity > peak_equity {
                peak_equity = state.total_equity;
            }
            let drawdown = peak_equity - state.total_equity;
            if drawdown > max_drawdown {
                max_drawdown = drawdown;
            }
            if peak_equity > Decimal::ZERO {
                let pct = drawdown / peak_equity * Decimal::ONE_HUNDRED;
                if pct > max_drawdown_pct {
                    max_drawdown_pct = pct;
                }
            }
        }

        report.max_drawdown = max_drawdown;
        report.max_drawdown_pct = max_drawdown_pct;
    }
}
