use crate::error::ApiError;
use crate::responses::{ChartResponse, ChartResult, Quote};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use core_types::{Bar, PriceSeries};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

pub mod error;
pub mod responses;

/// The ranges the chart endpoint accepts for `period`.
pub const SUPPORTED_PERIODS: &[&str] = &[
    "1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max",
];

/// The bar sizes the chart endpoint accepts for `interval`.
pub const SUPPORTED_INTERVALS: &[&str] = &[
    "1m", "2m", "5m", "15m", "30m", "60m", "90m", "1h", "1d", "5d", "1wk", "1mo", "3mo",
];

pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// The generic, abstract interface for a source of historical market data.
/// The CLI only talks to this trait, allowing the underlying implementation
/// (live or mock) to be swapped out.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetches the OHLCV history of `symbol` over `period`, one bar per `interval`.
    async fn fetch_bars(&self, symbol: &str, period: &str, interval: &str) -> Result<PriceSeries, ApiError>;
}

/// A concrete implementation of the `MarketDataProvider` for Yahoo Finance.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new() -> Result<Self, ApiError> {
        Self::with_base_url(YAHOO_BASE_URL)
    }

    /// Points the client at another host, e.g. a mock server in tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        // Yahoo rejects requests without a browser-like user agent.
        let client = reqwest::Client::builder()
            .user_agent("Mozilla/5.0")
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn validate_request(symbol: &str, period: &str, interval: &str) -> Result<(), ApiError> {
        if symbol.trim().is_empty() {
            return Err(ApiError::InvalidInput("symbol must not be empty".to_string()));
        }
        if !SUPPORTED_PERIODS.contains(&period) {
            return Err(ApiError::InvalidInput(format!("unsupported period '{period}'")));
        }
        if !SUPPORTED_INTERVALS.contains(&interval) {
            return Err(ApiError::InvalidInput(format!("unsupported interval '{interval}'")));
        }
        Ok(())
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn fetch_bars(&self, symbol: &str, period: &str, interval: &str) -> Result<PriceSeries, ApiError> {
        Self::validate_request(symbol, period, interval)?;

        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        tracing::info!(%symbol, %period, %interval, "Fetching Yahoo chart data");

        let response = self
            .client
            .get(&url)
            .query(&[("range", period), ("interval", interval)])
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        // Yahoo reports unknown symbols inside the envelope, usually with a 404.
        let chart = match serde_json::from_str::<ChartResponse>(&text) {
            Ok(parsed) => parsed.chart,
            Err(e) if status.is_success() => return Err(ApiError::Deserialization(e.to_string())),
            Err(_) => return Err(ApiError::ApiError(format!("HTTP {status}: {text}"))),
        };

        if let Some(error) = chart.error {
            return Err(ApiError::ApiError(format!("{} - {}", error.code, error.description)));
        }
        if !status.is_success() {
            return Err(ApiError::ApiError(format!("HTTP {status}")));
        }

        let result = chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| ApiError::DataUnavailable(format!("no chart result for {symbol}")))?;

        let bars = bars_from_chart(result)?;
        tracing::info!(%symbol, bars = bars.len(), "Fetched Yahoo chart data");

        Ok(PriceSeries::new(symbol, bars)?)
    }
}

/// Zips the column-oriented chart payload into bars.
///
/// A row that is `null` in every column is a bar without trades and is skipped.
/// A row missing only some of its fields is malformed.
fn bars_from_chart(result: ChartResult) -> Result<Vec<Bar>, ApiError> {
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let mut bars = Vec::with_capacity(result.timestamp.len());

    for (i, &ts) in result.timestamp.iter().enumerate() {
        let row = quote_row(&quote, i);
        let present = row.iter().filter(|v| v.is_some()).count();
        if present == 0 {
            tracing::debug!(timestamp = ts, "Skipping empty chart row");
            continue;
        }

        let [Some(open), Some(high), Some(low), Some(close), Some(volume)] = row else {
            return Err(ApiError::DataUnavailable(format!(
                "chart row at {ts} is missing {} of its 5 fields",
                5 - present
            )));
        };

        let timestamp = Utc
            .timestamp_opt(ts, 0)
            .single()
            .ok_or_else(|| ApiError::Deserialization(format!("Invalid timestamp: {ts}")))?;

        bars.push(Bar {
            timestamp,
            open: to_decimal(open, ts)?,
            high: to_decimal(high, ts)?,
            low: to_decimal(low, ts)?,
            close: to_decimal(close, ts)?,
            volume: to_decimal(volume, ts)?,
        });
    }

    Ok(bars)
}

fn quote_row(quote: &Quote, i: usize) -> [Option<f64>; 5] {
    let at = |column: &Vec<Option<f64>>| column.get(i).copied().flatten();
    [
        at(&quote.open),
        at(&quote.high),
        at(&quote.low),
        at(&quote.close),
        at(&quote.volume),
    ]
}

fn to_decimal(value: f64, ts: i64) -> Result<Decimal, ApiError> {
    Decimal::from_f64(value)
        .ok_or_else(|| ApiError::Deserialization(format!("Non-finite value {value} at {ts}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responses::Indicators;

    fn chart(timestamp: Vec<i64>, quote: Quote) -> ChartResult {
        ChartResult {
            timestamp,
            indicators: Indicators { quote: vec![quote] },
        }
    }

    #[test]
    fn rejects_unknown_period_and_interval() {
        assert!(YahooClient::validate_request("AAPL", "3mo", "1d").is_ok());
        assert!(matches!(
            YahooClient::validate_request("AAPL", "3 months", "1d"),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            YahooClient::validate_request("AAPL", "3mo", "daily"),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            YahooClient::validate_request("  ", "3mo", "1d"),
            Err(ApiError::InvalidInput(_))
        ));
    }

    #[test]
    fn skips_rows_without_any_trade_data() {
        let quote = Quote {
            open: vec![Some(10.0), None, Some(11.0)],
            high: vec![Some(10.5), None, Some(11.5)],
            low: vec![Some(9.5), None, Some(10.5)],
            close: vec![Some(10.25), None, Some(11.25)],
            volume: vec![Some(1000.0), None, Some(1200.0)],
        };
        let bars = bars_from_chart(chart(vec![1_700_000_000, 1_700_086_400, 1_700_172_800], quote)).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, Decimal::new(1025, 2));
        assert_eq!(bars[1].volume, Decimal::from(1200));
        assert_eq!(bars[1].timestamp.timestamp(), 1_700_172_800);
    }

    #[test]
    fn partially_missing_row_is_malformed() {
        let quote = Quote {
            open: vec![Some(10.0)],
            high: vec![Some(10.5)],
            low: vec![Some(9.5)],
            close: vec![None],
            volume: vec![Some(1000.0)],
        };
        let err = bars_from_chart(chart(vec![1_700_000_000], quote)).unwrap_err();
        assert!(matches!(err, ApiError::DataUnavailable(_)));
    }
}
