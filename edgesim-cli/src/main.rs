//! EdgeSim CLI — Monte Carlo trade-sequence simulation commands.
//!
//! Commands:
//! - `run` — execute a simulation from a TOML config file
//! - `per-trade` — per-trade simulation from flags
//! - `daily` — calendar simulation with loss limits from flags
//! - `budget` — check whether a configuration fits the iteration budget
//!
//! Logs go to stderr (`RUST_LOG` overrides the `info` default); `--json`
//! writes the full result to stdout.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use edgesim_core::budget::{check_budget, SIMULATION_BUDGET_CAP};
use edgesim_core::domain::{
    RiskLimit, RiskManagementProfile, RiskSizing, SimulationParams, SimulationRequest,
};
use edgesim_core::{check_daily, check_per_trade, ValidationError};
use edgesim_runner::export::export_json;
use edgesim_runner::{run_monte_carlo, ArtifactManager, MonteCarloResult, SimulationConfig};

#[derive(Parser)]
#[command(
    name = "edgesim",
    about = "EdgeSim CLI — Monte Carlo simulation of trade sequences from edge statistics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a simulation from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Per-trade simulation: a fixed number of trades per run.
    PerTrade {
        #[command(flatten)]
        edge: EdgeArgs,

        /// Trades per run.
        #[arg(long, default_value_t = 100)]
        trades: u32,

        /// Commission as a percentage of the amount at risk.
        #[arg(long, default_value_t = 0.0)]
        commission_percent: f64,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Daily simulation: a trading calendar with optional loss limits.
    Daily {
        #[command(flatten)]
        edge: EdgeArgs,

        /// Fraction of trades closed at breakeven, 0–1.
        #[arg(long, default_value_t = 0.0)]
        breakeven_rate: f64,

        /// Commission per trade in cents.
        #[arg(long, default_value_t = 0)]
        commission_cents: i64,

        #[arg(long, default_value_t = 5)]
        days_per_week: u32,

        #[arg(long, default_value_t = 21)]
        days_per_month: u32,

        #[arg(long, default_value_t = 12)]
        months: u32,

        #[arg(long, default_value_t = 3)]
        max_trades_per_day: u32,

        /// Daily loss limit: `2r` for R-multiples, `50000` for cents.
        #[arg(long, value_parser = parse_limit)]
        max_loss_day: Option<RiskLimit>,

        /// Weekly loss limit: `4r` or cents.
        #[arg(long, value_parser = parse_limit)]
        max_loss_week: Option<RiskLimit>,

        /// Monthly loss limit: `8r` or cents.
        #[arg(long, value_parser = parse_limit)]
        max_loss_month: Option<RiskLimit>,

        /// Risk multiplier on days that start below the high-water mark.
        #[arg(long, default_value_t = 1.0)]
        recovery_multiplier: f64,

        /// Risk multiplier on days that start at the high-water mark.
        #[arg(long, default_value_t = 1.0)]
        compounding_multiplier: f64,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Check whether a configuration fits the iteration budget.
    Budget {
        /// Path to a TOML config file.
        #[arg(long, conflicts_with_all = ["trades", "simulations"])]
        config: Option<PathBuf>,

        /// Trades per run.
        #[arg(long)]
        trades: Option<u64>,

        /// Number of runs.
        #[arg(long)]
        simulations: Option<u64>,
    },
}

/// Edge and sizing flags shared by both simulation modes.
#[derive(Args)]
struct EdgeArgs {
    /// Starting balance in cents.
    #[arg(long, default_value_t = 1_000_000)]
    initial_balance: i64,

    /// Risk per trade as a percentage of the current balance.
    #[arg(long, conflicts_with = "risk_cents")]
    risk_percent: Option<f64>,

    /// Fixed risk per trade in cents.
    #[arg(long)]
    risk_cents: Option<i64>,

    /// Win rate in percent, 0–100.
    #[arg(long, default_value_t = 50.0)]
    win_rate: f64,

    /// Reward:risk ratio of a winning trade.
    #[arg(long, default_value_t = 2.0)]
    reward_risk: f64,

    /// Number of independent runs.
    #[arg(long, default_value_t = 1_000)]
    simulations: u32,

    /// Ruin line as a percentage of the starting balance.
    #[arg(long, default_value_t = 0.0)]
    ruin_threshold: f64,
}

impl EdgeArgs {
    fn risk(&self) -> RiskSizing {
        match (self.risk_percent, self.risk_cents) {
            (_, Some(cents)) => RiskSizing::FixedAmount { cents },
            (Some(percent), None) => RiskSizing::PercentOfBalance { percent },
            (None, None) => RiskSizing::PercentOfBalance { percent: 1.0 },
        }
    }
}

/// Execution and output flags.
#[derive(Args)]
struct OutputArgs {
    /// Master seed (overrides the config file).
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads (overrides the config file).
    #[arg(long)]
    threads: Option<usize>,

    /// Histogram bucket count (overrides the config file).
    #[arg(long)]
    buckets: Option<usize>,

    /// Write manifest, result, CSVs and report under this directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print the full result as JSON on stdout.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            let config = SimulationConfig::from_file(&config)
                .with_context(|| format!("failed to load {}", config.display()))?;
            run_simulation(config, &output)
        }
        Commands::PerTrade {
            edge,
            trades,
            commission_percent,
            output,
        } => {
            let params = SimulationParams {
                initial_balance: edge.initial_balance,
                risk: edge.risk(),
                win_rate: edge.win_rate,
                reward_risk_ratio: edge.reward_risk,
                number_of_trades: trades,
                commission_percent,
                simulation_count: edge.simulations,
                ruin_threshold_percent: edge.ruin_threshold,
            };
            run_simulation(SimulationConfig::new(SimulationRequest::PerTrade(params)), &output)
        }
        Commands::Daily {
            edge,
            breakeven_rate,
            commission_cents,
            days_per_week,
            days_per_month,
            months,
            max_trades_per_day,
            max_loss_day,
            max_loss_week,
            max_loss_month,
            recovery_multiplier,
            compounding_multiplier,
            output,
        } => {
            let profile = RiskManagementProfile {
                initial_balance: edge.initial_balance,
                risk: edge.risk(),
                win_rate: edge.win_rate,
                reward_risk_ratio: edge.reward_risk,
                breakeven_rate,
                commission_per_trade: commission_cents,
                trading_days_per_week: days_per_week,
                trading_days_per_month: days_per_month,
                months_to_trade: months,
                max_trades_per_day,
                max_loss_per_day: max_loss_day,
                max_loss_per_week: max_loss_week,
                max_loss_per_month: max_loss_month,
                loss_recovery_risk_multiplier: recovery_multiplier,
                gain_compounding_risk_multiplier: compounding_multiplier,
                ruin_threshold_percent: edge.ruin_threshold,
                simulation_count: edge.simulations,
            };
            run_simulation(SimulationConfig::new(SimulationRequest::Daily(profile)), &output)
        }
        Commands::Budget {
            config,
            trades,
            simulations,
        } => run_budget(config, trades, simulations),
    }
}

fn run_simulation(mut config: SimulationConfig, output: &OutputArgs) -> Result<()> {
    if let Some(seed) = output.seed {
        config.ensemble.seed = seed;
    }
    if let Some(threads) = output.threads {
        config.ensemble.threads = threads;
    }
    if let Some(buckets) = output.buckets {
        config.output.bucket_count = buckets;
    }

    let start = Instant::now();
    let result = run_monte_carlo(&config.simulation, &config.options(), None)?;
    let duration_secs = start.elapsed().as_secs_f64();
    info!(
        mode = result.mode(),
        simulations = result.statistics().simulation_count,
        duration_secs,
        "simulation complete"
    );

    if output.json {
        println!("{}", export_json(&result)?);
    } else {
        print_summary(&result);
    }

    if let Some(dir) = &output.output_dir {
        let manager = ArtifactManager::new(dir)?;
        let paths = manager.save_run(&config, &result, duration_secs)?;
        eprintln!("Artifacts saved to: {}", paths.run_dir.display());
    }

    Ok(())
}

fn run_budget(
    config: Option<PathBuf>,
    trades: Option<u64>,
    simulations: Option<u64>,
) -> Result<()> {
    let mut trade_unit = "trades per run";
    let checked = if let Some(path) = config {
        // Parsed without range checks so an oversized file still reports.
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = SimulationConfig::parse_toml(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        match &config.simulation {
            SimulationRequest::PerTrade(p) => check_per_trade(p),
            SimulationRequest::Daily(p) => {
                trade_unit = "trades per day";
                check_daily(p)
            }
        }
    } else {
        match (trades, simulations) {
            (Some(t), Some(s)) => check_budget(t, s, SIMULATION_BUDGET_CAP),
            _ => bail!("either --config or both --trades and --simulations are required"),
        }
    };

    match checked {
        Ok(total) => {
            println!("OK: {total} trade draws fit the budget");
            Ok(())
        }
        Err(ValidationError::BudgetExceeded {
            total,
            cap,
            max_trades,
            max_simulations,
        }) => {
            println!("Over budget: {total} trade draws exceed the cap of {cap}");
            println!("  keep the simulation count: at most {max_trades} {trade_unit}");
            println!("  keep the trade count:      at most {max_simulations} simulations");
            bail!("iteration budget exceeded")
        }
        Err(e) => Err(e.into()),
    }
}

/// Parse `2r` / `2.5R` as R-multiples and a bare integer as cents.
fn parse_limit(s: &str) -> Result<RiskLimit, String> {
    let s = s.trim();
    if let Some(r) = s.strip_suffix(['r', 'R']) {
        let value: f64 = r.trim().parse().map_err(|e| format!("invalid R limit '{s}': {e}"))?;
        return Ok(RiskLimit::R { value });
    }
    let cents: i64 = s
        .parse()
        .map_err(|e| format!("invalid limit '{s}' (use e.g. 2r or 50000): {e}"))?;
    Ok(RiskLimit::Currency { cents })
}

fn print_summary(result: &MonteCarloResult) {
    let s = result.statistics();
    let money = |cents: f64| format!("${:.2}", cents / 100.0);

    println!("=== EdgeSim {} ===", result.mode());
    println!("Simulations:       {}", s.simulation_count);
    println!("Seed:              {}", result.master_seed());
    println!(
        "Final R:           worst {:+.2} | median {:+.2} | best {:+.2}",
        s.final_r.worst_case, s.final_r.median, s.final_r.best_case
    );
    println!(
        "Final balance:     worst {} | median {} | best {}",
        money(s.final_balance.worst_case),
        money(s.final_balance.median),
        money(s.final_balance.best_case)
    );
    println!("Profitable runs:   {:.1}%", s.profitable_pct);
    println!("Ruin probability:  {:.2}%", s.ruin_probability * 100.0);
    println!("Sharpe / Sortino:  {:.3} / {:.3}", s.sharpe_ratio, s.sortino_ratio);
    println!("Profit factor:     {}", s.profit_factor);
    println!(
        "Max drawdown:      median {:.2}% | worst {:.2}%",
        s.max_drawdown_pct.median, s.max_drawdown_pct.worst
    );
    println!(
        "Streaks (win/loss): expected max {:.1}/{:.1}, average {:.2}/{:.2}",
        s.expected_max_win_streak,
        s.expected_max_loss_streak,
        s.average_win_streak,
        s.average_loss_streak
    );
    if let MonteCarloResult::Daily(daily) = result {
        let c = &daily.calendar;
        println!(
            "Mode days (avg):   recovery {:.1} | compounding {:.1} | skipped weekly {:.1} | skipped monthly {:.1}",
            c.average_loss_recovery_days,
            c.average_gain_compounding_days,
            c.average_skipped_weekly_days,
            c.average_skipped_monthly_days
        );
        println!("Calmar:            {:.3}", c.calmar_ratio);
    }
}
