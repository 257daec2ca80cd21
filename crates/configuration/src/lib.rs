use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    BacktestSettings, Config, DataSettings, EmailConfig, LoggingConfig, MACrossoverParams, RsiParams,
    Strategies, TelegramConfig, VolumeSpikeParams,
};

/// The file read when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Prefix for environment overrides, e.g. `SIGNALSPRINT__BACKTEST__INITIAL_CAPITAL=5000`.
pub const ENV_PREFIX: &str = "SIGNALSPRINT";

/// Loads the application configuration.
///
/// Sources are layered in order: built-in defaults, then the TOML file at `path`
/// (or `config.toml` in the working directory; a missing file is not an error),
/// then `SIGNALSPRINT__*` environment variables. The merged result is validated
/// before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    load_config_with_env(path, environment())
}

/// The `SIGNALSPRINT__*` source; `strategies.enabled` is read as a comma-separated list.
pub fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("strategies.enabled")
}

/// Like [`load_config`], with the environment layer supplied by the caller.
pub fn load_config_with_env(path: Option<&Path>, environment: config::Environment) -> Result<Config, ConfigError> {
    let file = match path {
        // An explicitly requested file must exist.
        Some(p) => config::File::from(p).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(environment)
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    config.validate().map_err(ConfigError::ValidationError)?;
    Ok(config)
}
