//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: sample-run trade/day tape and histogram buckets
//! - **Markdown**: human-readable summary report
//!
//! Persisted results carry a `schema_version`. Unknown versions are rejected
//! on load.

mod artifacts;
mod report;

use anyhow::{bail, Context, Result};

use edgesim_core::domain::{SimulatedDay, SimulatedTrade};

use crate::buckets::DistributionBucket;
use crate::result::{MonteCarloResult, SCHEMA_VERSION};

pub use artifacts::{ArtifactManager, ArtifactPaths, RunManifest};
pub use report::render_markdown;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `MonteCarloResult` to pretty JSON.
pub fn export_json(result: &MonteCarloResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize MonteCarloResult to JSON")
}

/// Deserialize a `MonteCarloResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<MonteCarloResult> {
    let result: MonteCarloResult =
        serde_json::from_str(json).context("failed to deserialize MonteCarloResult from JSON")?;
    if result.schema_version() > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version(),
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a trade sequence as CSV.
///
/// Columns: trade_number, outcome, r_result, commission_r, net_r, pnl,
/// balance_after, cumulative_r, drawdown_pct
pub fn trades_csv(trades: &[SimulatedTrade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "trade_number",
        "outcome",
        "r_result",
        "commission_r",
        "net_r",
        "pnl",
        "balance_after",
        "cumulative_r",
        "drawdown_pct",
    ])?;
    for t in trades {
        wtr.write_record([
            t.trade_number.to_string(),
            t.outcome.as_str().to_string(),
            format!("{:.4}", t.r_result),
            format!("{:.6}", t.commission_r),
            format!("{:.6}", t.net_r()),
            t.pnl.to_string(),
            t.balance_after.to_string(),
            format!("{:.6}", t.cumulative_r),
            format!("{:.4}", t.drawdown_pct),
        ])?;
    }
    finish(wtr)
}

/// Export a day sequence as CSV, one row per day.
///
/// Columns: day_number, month, week, mode, trades, day_r, day_pnl,
/// balance_after, drawdown_pct, halted_by_daily_limit
pub fn days_csv(days: &[SimulatedDay]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "day_number",
        "month",
        "week",
        "mode",
        "trades",
        "day_r",
        "day_pnl",
        "balance_after",
        "drawdown_pct",
        "halted_by_daily_limit",
    ])?;
    for d in days {
        wtr.write_record([
            d.day_number.to_string(),
            d.month_number.to_string(),
            d.week_number.to_string(),
            d.mode.as_str().to_string(),
            d.trades.len().to_string(),
            format!("{:.6}", d.day_r),
            d.day_pnl.to_string(),
            d.balance_after.to_string(),
            format!("{:.4}", d.drawdown_pct),
            d.halted_by_daily_limit.to_string(),
        ])?;
    }
    finish(wtr)
}

/// Export the sample run of a result: trades for per-trade, days for daily.
pub fn sample_run_csv(result: &MonteCarloResult) -> Result<String> {
    match result {
        MonteCarloResult::PerTrade(r) => trades_csv(&r.sample_run.trades),
        MonteCarloResult::Daily(r) => days_csv(&r.sample_run.days),
    }
}

/// Export histogram buckets as CSV.
///
/// Columns: range_start, range_end, count, percentage
pub fn buckets_csv(buckets: &[DistributionBucket]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["range_start", "range_end", "count", "percentage"])?;
    for b in buckets {
        wtr.write_record([
            format!("{:.2}", b.range_start),
            format!("{:.2}", b.range_end),
            b.count.to_string(),
            format!("{:.4}", b.percentage),
        ])?;
    }
    finish(wtr)
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}
