use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single OHLCV observation for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

/// One row of a simulated portfolio trajectory.
///
/// `total_equity` is always exactly `position_value + cash`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
    /// Units of the underlying held after this row's signal is applied.
    pub exposure: Decimal,
    /// Change in exposure relative to the previous row. Zero on the first row.
    pub position_delta: Decimal,
    pub position_value: Decimal,
    pub cash: Decimal,
    pub total_equity: Decimal,
    /// Fractional change of `total_equity` from the previous row.
    /// `None` on the first row, or when the previous equity was zero.
    pub returns: Option<Decimal>,
}
