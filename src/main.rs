use alerter::{AlertDispatcher, Delivery};
use anyhow::{bail, Context};
use api_client::{MarketDataProvider, YahooClient};
use backtester::Backtester;
use clap::{Args, Parser, Subcommand};
use configuration::{load_config, Config};
use core_types::PriceSeries;
use std::path::PathBuf;

mod analysis;
mod display;

use analysis::{analyze_series, AnalysisReport};

/// The main entry point for the SignalSprint application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load secrets such as SIGNALSPRINT__TELEGRAM__TOKEN from a .env file, if present.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = configuration::logging::init(&config.logging)?;
    tracing::debug!(
        symbol = %config.data.symbol,
        strategies = ?config.strategies.enabled,
        telegram = !config.telegram.token.is_empty(),
        email = config.email.is_enabled(),
        "configuration loaded"
    );

    // Execute the appropriate command
    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, &config).await,
        Commands::Alert(args) => handle_alert(args, &config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Trading-signal engine: MA crossover, RSI and volume-spike signals with backtests.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults to ./config.toml when it exists.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch prices, generate every enabled signal and backtest each strategy.
    Analyze(AnalyzeArgs),
    /// Send alerts for signals triggered on the most recent bar.
    Alert(AlertArgs),
}

/// Overrides for the `[data]` section of the config.
#[derive(Args)]
struct DataArgs {
    /// The ticker to analyze (e.g., "AAPL").
    #[arg(long)]
    symbol: Option<String>,

    /// How much history to fetch (e.g., "3mo", "1y").
    #[arg(long)]
    period: Option<String>,

    /// The bar size (e.g., "1d", "1h").
    #[arg(long)]
    interval: Option<String>,
}

#[derive(Args)]
struct AnalyzeArgs {
    #[command(flatten)]
    data: DataArgs,

    /// How many of the most recent bars to show.
    #[arg(long, default_value_t = 10)]
    tail: usize,

    /// Print the full report as JSON instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AlertArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Print the alerts instead of sending them.
    #[arg(long)]
    dry_run: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Fetches the series and runs the analysis shared by both commands.
async fn run_analysis(data: DataArgs, config: &Config) -> anyhow::Result<AnalysisReport> {
    let symbol = data.symbol.unwrap_or_else(|| config.data.symbol.clone());
    let period = data.period.unwrap_or_else(|| config.data.period.clone());
    let interval = data.interval.unwrap_or_else(|| config.data.interval.clone());

    let provider = YahooClient::new()?;
    let series: PriceSeries = provider
        .fetch_bars(&symbol, &period, &interval)
        .await
        .with_context(|| format!("Failed to fetch {symbol} ({period}, {interval})"))?;

    let backtester = Backtester::from_settings(&config.backtest)?;
    let strategies = config.strategies.clone();

    // The generators are CPU-bound; keep them off the async runtime's threads.
    let report = tokio::task::spawn_blocking(move || analyze_series(&backtester, &strategies, &series))
        .await
        .context("Analysis task panicked")??;

    Ok(report)
}

async fn handle_analyze(args: AnalyzeArgs, config: &Config) -> anyhow::Result<()> {
    let report = run_analysis(args.data, config).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} ({} bars)\n", report.symbol, report.bars);
    println!("Recent Signals");
    println!("{}\n", display::signals_table(&report.recent_signals(args.tail)));
    println!("Performance");
    println!("{}", display::metrics_table(&report));

    Ok(())
}

async fn handle_alert(args: AlertArgs, config: &Config) -> anyhow::Result<()> {
    let report = run_analysis(args.data, config).await?;
    let alerts = report.latest_alerts();

    if alerts.is_empty() {
        println!("No signals triggered on the latest bar for {}.", report.symbol);
        return Ok(());
    }

    if args.dry_run {
        for alert in &alerts {
            println!("[{}] {}", alert.strategy, alert.message());
        }
        return Ok(());
    }

    let dispatcher = AlertDispatcher::from_config(config).context("Failed to set up alert destinations")?;
    if !dispatcher.is_configured() {
        bail!("No alert destination configured. Set [telegram] or [email] in the config, or use --dry-run.");
    }

    let mut failures = 0;
    for alert in &alerts {
        for outcome in dispatcher.dispatch(alert).await? {
            match outcome {
                Ok(Delivery::Telegram { chat_id }) => println!("Sent to Telegram chat {chat_id}: {}", alert.message()),
                Ok(Delivery::Email(email)) => println!("Emailed {}: {}", email.to, email.subject),
                Err(e) => {
                    failures += 1;
                    eprintln!("Failed to deliver alert: {e}");
                }
            }
        }
    }

    if failures > 0 {
        bail!("{failures} alert deliveries failed");
    }
    Ok(())
}
