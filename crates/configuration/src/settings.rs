use core_types::StrategyId;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty (or missing) `config.toml` yields a
/// runnable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataSettings,
    pub backtest: BacktestSettings,
    pub strategies: Strategies,
    pub telegram: TelegramConfig,
    pub email: EmailConfig,
    pub logging: LoggingConfig,
}

/// Which market data to request from the provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// The ticker to analyse (e.g., "AAPL").
    pub symbol: String,
    /// How far back to fetch (e.g., "3mo", "1y").
    pub period: String,
    /// The bar interval (e.g., "1d", "1h").
    pub interval: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            symbol: "AAPL".to_string(),
            period: "3mo".to_string(),
            interval: "1d".to_string(),
        }
    }
}

/// Contains parameters for the backtest simulator and the metrics it reports.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    /// The initial starting capital for the simulation.
    pub initial_capital: Decimal,
    /// Number of bars in a trading year, used to annualise the Sharpe ratio.
    /// 252 for daily bars.
    pub trading_periods_per_year: u32,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            initial_capital: dec!(100000),
            trading_periods_per_year: 252,
        }
    }
}

/// Contains the parameter sets for all available signal generators.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Strategies {
    /// Which generators the CLI runs. Defaults to all of them.
    pub enabled: Vec<StrategyId>,
    pub ma_crossover: MACrossoverParams,
    pub rsi: RsiParams,
    pub volume_spike: VolumeSpikeParams,
}

impl Default for Strategies {
    fn default() -> Self {
        Self {
            enabled: StrategyId::ALL.to_vec(),
            ma_crossover: MACrossoverParams::default(),
            rsi: RsiParams::default(),
            volume_spike: VolumeSpikeParams::default(),
        }
    }
}

/// Parameters for the moving-average crossover generator.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct MACrossoverParams {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for MACrossoverParams {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 50,
        }
    }
}

/// Parameters for the RSI overbought/oversold generator.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RsiParams {
    pub period: usize,
    /// RSI above this is overbought (sell).
    pub upper: Decimal,
    /// RSI below this is oversold (buy).
    pub lower: Decimal,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self {
            period: 14,
            upper: dec!(70),
            lower: dec!(30),
        }
    }
}

/// Parameters for the volume-spike generator.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct VolumeSpikeParams {
    pub window: usize,
    /// Volume must exceed `threshold` times its trailing average.
    pub threshold: Decimal,
}

impl Default for VolumeSpikeParams {
    fn default() -> Self {
        Self {
            window: 20,
            threshold: dec!(2.0),
        }
    }
}

/// Telegram bot credentials. Alerts are disabled when either field is empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
}

/// SMTP settings for email alerts. Email is disabled unless `to`, `from`
/// and `password` are all set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub to: String,
    /// Sender address, also used as the SMTP login.
    pub from: String,
    pub password: String,
    /// Relay reached over STARTTLS.
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            to: String::new(),
            from: String::new(),
            password: String::new(),
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
        }
    }
}

impl EmailConfig {
    pub fn is_enabled(&self) -> bool {
        [&self.to, &self.from, &self.password]
            .iter()
            .all(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

// --- Validation ---
// Each parameter set knows its own constraints. The generators call these
// before touching any data, and `Config::validate` runs them all at load time.

impl MACrossoverParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.short_window == 0 {
            return Err("short_window must be at least 1".to_string());
        }
        if self.long_window <= self.short_window {
            return Err(format!(
                "long_window ({}) must be greater than short_window ({})",
                self.long_window, self.short_window
            ));
        }
        Ok(())
    }
}

impl RsiParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.period == 0 {
            return Err("RSI period must be at least 1".to_string());
        }
        let hundred = Decimal::ONE_HUNDRED;
        let in_range = |v: Decimal| v >= Decimal::ZERO && v <= hundred;
        if !in_range(self.upper) || !in_range(self.lower) {
            return Err(format!(
                "RSI thresholds must lie within 0..=100 (upper {}, lower {})",
                self.upper, self.lower
            ));
        }
        if self.upper <= self.lower {
            return Err(format!(
                "RSI upper threshold ({}) must be greater than lower threshold ({})",
                self.upper, self.lower
            ));
        }
        Ok(())
    }
}

impl VolumeSpikeParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.window == 0 {
            return Err("volume window must be at least 1".to_string());
        }
        if self.threshold <= Decimal::ZERO {
            return Err(format!(
                "volume threshold must be positive, got {}",
                self.threshold
            ));
        }
        Ok(())
    }
}

impl BacktestSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.initial_capital <= Decimal::ZERO {
            return Err(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            ));
        }
        if self.trading_periods_per_year == 0 {
            return Err("trading_periods_per_year must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Config {
    /// Checks every section, reporting the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        self.backtest.validate()?;
        self.strategies.ma_crossover.validate()?;
        self.strategies.rsi.validate()?;
        self.strategies.volume_spike.validate()?;
        if self.strategies.enabled.is_empty() {
            return Err("strategies.enabled must list at least one strategy".to_string());
        }
        if self.data.symbol.trim().is_empty() {
            return Err("data.symbol must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn email_needs_recipient_sender_and_password() {
        let mut email = EmailConfig::default();
        assert!(!email.is_enabled());
        assert_eq!(email.smtp_port, 587);

        email.to = "desk@example.com".to_string();
        email.from = "bot@example.com".to_string();
        assert!(!email.is_enabled());

        email.password = "app-password".to_string();
        assert!(email.is_enabled());
    }

    #[test]
    fn ma_windows_must_be_ordered() {
        let params = MACrossoverParams { short_window: 5, long_window: 5 };
        assert!(params.validate().is_err());
        let params = MACrossoverParams { short_window: 0, long_window: 5 };
        assert!(params.validate().is_err());
        let params = MACrossoverParams { short_window: 2, long_window: 3 };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn rsi_thresholds_must_be_ordered_and_bounded() {
        let mut params = RsiParams::default();
        params.upper = dec!(30);
        params.lower = dec!(70);
        assert!(params.validate().is_err());

        let mut params = RsiParams::default();
        params.upper = dec!(120);
        assert!(params.validate().is_err());

        let mut params = RsiParams::default();
        params.period = 0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn volume_threshold_must_be_positive() {
        let params = VolumeSpikeParams { window: 20, threshold: dec!(0) };
        assert!(params.validate().is_err());
        let params = VolumeSpikeParams { window: 0, threshold: dec!(2) };
        assert!(params.validate().is_err());
    }

    #[test]
    fn backtest_settings_require_positive_values() {
        let settings = BacktestSettings { initial_capital: dec!(0), trading_periods_per_year: 252 };
        assert!(settings.validate().is_err());
        let settings = BacktestSettings { initial_capital: dec!(1000), trading_periods_per_year: 0 };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn at_least_one_strategy_must_be_enabled() {
        let mut config = Config::default();
        config.strategies.enabled.clear();
        assert!(config.validate().is_err());
    }
}
