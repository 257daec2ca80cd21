use crate::analysis::{AnalysisReport, RecentSignal};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use rust_decimal::Decimal;
use std::fmt::Display;

const MISSING: &str = "-";

fn or_missing<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

fn pct(value: Option<Decimal>) -> String {
    or_missing(value.map(|v| format!("{:.2}%", v * Decimal::ONE_HUNDRED)))
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// The "Recent Signals" table: one row per bar, one column per generator.
pub fn signals_table(rows: &[RecentSignal]) -> Table {
    let mut table = new_table(vec!["Date", "Close", "MA Crossover", "RSI", "Volume Spike"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(row.timestamp.format("%Y-%m-%d")),
            Cell::new(row.price.round_dp(2)).set_alignment(CellAlignment::Right),
            Cell::new(or_missing(row.ma_position.map(|p| p.normalize()))).set_alignment(CellAlignment::Center),
            Cell::new(or_missing(row.rsi_signal)).set_alignment(CellAlignment::Center),
            Cell::new(or_missing(row.volume_signal)).set_alignment(CellAlignment::Center),
        ]);
    }
    table
}

/// One row of performance metrics per backtested strategy.
pub fn metrics_table(report: &AnalysisReport) -> Table {
    let mut table = new_table(vec![
        "Strategy",
        "Final Equity",
        "Cumulative Return",
        "Sharpe Ratio",
        "Max Drawdown",
        "Trades",
    ]);
    for run in &report.runs {
        let metrics = &run.outcome.report;
        table.add_row(vec![
            Cell::new(run.outcome.strategy),
            Cell::new(metrics.final_equity.round_dp(2)).set_alignment(CellAlignment::Right),
            Cell::new(pct(metrics.cumulative_return)).set_alignment(CellAlignment::Right),
            Cell::new(or_missing(metrics.sharpe_ratio.map(|s| s.round_dp(3)))).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}%", metrics.max_drawdown_pct)).set_alignment(CellAlignment::Right),
            Cell::new(metrics.total_trades).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::SignalAction;
    use rust_decimal_macros::dec;

    #[test]
    fn unavailable_values_render_as_dashes() {
        let rows = vec![RecentSignal {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
            price: dec!(185.6449),
            ma_position: None,
            rsi_signal: Some(SignalAction::Sell),
            volume_signal: None,
        }];
        let rendered = signals_table(&rows).to_string();
        assert!(rendered.contains("2024-01-02"));
        assert!(rendered.contains("185.64"));
        assert!(rendered.contains("Sell"));
        assert!(rendered.contains(MISSING));
    }

    #[test]
    fn returns_render_as_percentages() {
        assert_eq!(pct(Some(dec!(0.00002))), "0.00%");
        assert_eq!(pct(Some(dec!(-0.1234))), "-12.34%");
        assert_eq!(pct(None), "-");
    }
}
