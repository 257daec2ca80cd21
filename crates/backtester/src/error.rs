use thiserror::Error;

#[derive(Error, Debug)]
pub enum BacktestError {
    #[error("Invalid backtest parameter: {0}")]
    InvalidParameter(String),

    #[error("Signal series is empty; nothing to simulate.")]
    DataUnavailable,

    #[error("Arithmetic overflow while simulating at {0}")]
    Overflow(String),

    #[error("Strategy execution error: {0}")]
    Strategy(#[from] strategies::StrategyError),

    #[error("Analytics calculation error: {0}")]
    Analytics(#[from] analytics::AnalyticsError),
}
