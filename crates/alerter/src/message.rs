use chrono::{DateTime, NaiveDate, Utc};
use core_types::{SignalAction, StrategyId};
use rust_decimal::Decimal;
use serde::Serialize;
use strategies::SignalRecord;

/// Renders the one-line alert text, e.g.
/// `Buy signal triggered for AAPL at 185.64 on 2024-01-02`.
///
/// `Hold` is not an alert, so it renders to `None`.
pub fn render_signal_alert(symbol: &str, action: SignalAction, price: Decimal, date: NaiveDate) -> Option<String> {
    if action == SignalAction::Hold {
        return None;
    }
    Some(format!(
        "{action} signal triggered for {symbol} at {} on {}",
        price.round_dp(2),
        date.format("%Y-%m-%d")
    ))
}

/// A triggered signal, ready to be rendered for any destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalAlert {
    pub symbol: String,
    pub strategy: StrategyId,
    pub action: SignalAction,
    pub price: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl SignalAlert {
    /// Builds an alert from a record whose `trigger` is set, `None` otherwise.
    pub fn from_record(symbol: &str, strategy: StrategyId, record: &dyn SignalRecord) -> Option<Self> {
        let action = record.trigger()?;
        Some(Self {
            symbol: symbol.to_string(),
            strategy,
            action,
            price: record.price(),
            timestamp: record.timestamp(),
        })
    }

    pub fn message(&self) -> String {
        // `from_record` never builds a Hold alert.
        render_signal_alert(&self.symbol, self.action, self.price, self.timestamp.date_naive())
            .unwrap_or_default()
    }

    pub fn subject(&self) -> String {
        format!("SignalSprint: {} {} ({})", self.action, self.symbol, self.strategy)
    }
}

/// The subject and body of one alert email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailAlert {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailAlert {
    pub fn new(to: impl Into<String>, alert: &SignalAlert) -> Self {
        Self {
            to: to.into(),
            subject: alert.subject(),
            body: alert.message(),
        }
    }
}
