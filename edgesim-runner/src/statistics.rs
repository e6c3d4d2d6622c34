//! Statistics reducer — ensemble of run summaries in, aggregate metrics out.
//!
//! Percentiles are nearest-rank on the ascending sort:
//! - median: middle element, or the mean of the two middle elements
//! - best case: `a[min(floor(0.95 n), n - 1)]`
//! - worst case: `a[floor(0.05 n)]`
//!
//! Every ratio guards its denominator and returns 0.0 instead of NaN. The one
//! exception is the profit factor, which is `Infinity` when nothing lost.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use edgesim_core::domain::{DailyRunSummary, RiskManagementProfile, RunSummary};
use edgesim_core::RunningMoments;

// ─── Percentiles ────────────────────────────────────────────────────

/// Median of an ascending-sorted slice. Returns 0.0 when empty.
pub fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// 95th percentile by nearest rank. Returns 0.0 when empty.
pub fn best_case(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    sorted[((0.95 * n as f64).floor() as usize).min(n - 1)]
}

/// 5th percentile by nearest rank. Returns 0.0 when empty.
pub fn worst_case(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    sorted[((0.05 * n as f64).floor() as usize).min(n - 1)]
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values
}

/// Median, mean and the 95th/5th nearest-rank percentiles of one quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentileSummary {
    pub median: f64,
    pub mean: f64,
    pub best_case: f64,
    pub worst_case: f64,
}

impl PercentileSummary {
    pub fn from_values(values: Vec<f64>) -> Self {
        let mean = mean_f64(&values);
        let s = sorted(values);
        Self {
            median: median(&s),
            mean,
            best_case: best_case(&s),
            worst_case: worst_case(&s),
        }
    }
}

/// Drawdown distribution: larger is worse, so `worst` is the maximum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawdownSummary {
    pub median: f64,
    pub mean: f64,
    pub worst: f64,
}

impl DrawdownSummary {
    pub fn from_values(values: Vec<f64>) -> Self {
        let mean = mean_f64(&values);
        let s = sorted(values);
        Self {
            median: median(&s),
            mean,
            worst: s.last().copied().unwrap_or(0.0),
        }
    }
}

// ─── Profit factor ──────────────────────────────────────────────────

/// Gross profit over gross loss, with an explicit infinite case.
///
/// Serializes as a JSON number, or as the string `"Infinity"` when no trade
/// in the ensemble lost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProfitFactor {
    Finite(f64),
    Infinite,
}

impl ProfitFactor {
    /// 0.0 when nothing was won, `Infinite` when something was won and nothing lost.
    pub fn from_gross(gross_profit: f64, gross_loss: f64) -> Self {
        if gross_profit <= 0.0 {
            Self::Finite(0.0)
        } else if gross_loss <= 0.0 {
            Self::Infinite
        } else {
            Self::Finite(gross_profit / gross_loss)
        }
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Self::Infinite)
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Finite(v) => v,
            Self::Infinite => f64::INFINITY,
        }
    }
}

impl Default for ProfitFactor {
    fn default() -> Self {
        Self::Finite(0.0)
    }
}

impl fmt::Display for ProfitFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(v) => write!(f, "{v:.2}"),
            Self::Infinite => f.write_str("Infinity"),
        }
    }
}

impl Serialize for ProfitFactor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Self::Finite(v) => serializer.serialize_f64(v),
            Self::Infinite => serializer.serialize_str("Infinity"),
        }
    }
}

impl<'de> Deserialize<'de> for ProfitFactor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ProfitFactorVisitor;

        impl<'de> Visitor<'de> for ProfitFactorVisitor {
            type Value = ProfitFactor;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a finite number or the string \"Infinity\"")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                if v.is_infinite() && v > 0.0 {
                    Ok(ProfitFactor::Infinite)
                } else if v.is_finite() {
                    Ok(ProfitFactor::Finite(v))
                } else {
                    Err(E::custom("profit factor must not be NaN or negative infinity"))
                }
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(ProfitFactor::Finite(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(ProfitFactor::Finite(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                match v {
                    "Infinity" | "inf" => Ok(ProfitFactor::Infinite),
                    other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
                }
            }
        }

        deserializer.deserialize_any(ProfitFactorVisitor)
    }
}

// ─── Risk-adjusted ratios ───────────────────────────────────────────

/// Sharpe ratio from pooled return moments.
///
/// Sharpe = mean / std * annualization. Returns 0.0 with fewer than two
/// observations or zero variance.
pub fn sharpe_ratio(returns: &RunningMoments, annualization: f64) -> f64 {
    if returns.count < 2 {
        return 0.0;
    }
    let std = returns.std_dev();
    if std < 1e-15 {
        return 0.0;
    }
    finite_or_zero(returns.mean / std * annualization)
}

/// Sortino ratio from pooled return moments (downside deviation only).
///
/// Returns 0.0 with fewer than two observations or no downside.
pub fn sortino_ratio(returns: &RunningMoments, annualization: f64) -> f64 {
    if returns.count < 2 {
        return 0.0;
    }
    let downside = returns.downside_deviation();
    if downside < 1e-15 {
        return 0.0;
    }
    finite_or_zero(returns.mean / downside * annualization)
}

/// Calmar ratio: annualized return / max drawdown, both as fractions.
///
/// Returns 0.0 when the drawdown is zero.
pub fn calmar_ratio(annualized_return: f64, max_drawdown: f64) -> f64 {
    if max_drawdown.abs() < 1e-15 {
        return 0.0;
    }
    finite_or_zero(annualized_return / max_drawdown.abs())
}

/// Compound annual growth of one run: `(final / initial)^(1 / years) - 1`.
///
/// A wiped-out run is -100%. Returns 0.0 for a zero-length calendar.
pub fn annualized_return(initial: f64, final_balance: f64, years: f64) -> f64 {
    if years <= 0.0 || initial <= 0.0 {
        return 0.0;
    }
    if final_balance <= 0.0 {
        return -1.0;
    }
    finite_or_zero((final_balance / initial).powf(1.0 / years) - 1.0)
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

// ─── Ensemble statistics ────────────────────────────────────────────

/// Aggregate metrics over an ensemble of runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationStatistics {
    pub simulation_count: usize,
    /// Terminal cumulative net R.
    pub final_r: PercentileSummary,
    /// Terminal balance in cents.
    pub final_balance: PercentileSummary,
    /// Terminal return in percent of the initial balance.
    pub return_pct: PercentileSummary,
    /// Percent of runs ending above the initial balance.
    pub profitable_pct: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub profit_factor: ProfitFactor,
    pub max_drawdown_pct: DrawdownSummary,
    pub max_drawdown_amount: DrawdownSummary,
    pub max_drawdown_r: DrawdownSummary,
    /// Mean of each run's longest win streak.
    pub expected_max_win_streak: f64,
    pub expected_max_loss_streak: f64,
    /// Mean length of every win streak pooled over all runs.
    pub average_win_streak: f64,
    pub average_loss_streak: f64,
    /// Pooled wins / trades taken, in percent.
    pub observed_win_rate: f64,
    pub average_trades: f64,
    pub average_commission: f64,
    /// Fraction of runs at or below the ruin line, 0–1.
    pub ruin_probability: f64,
    pub wiped_out_runs: usize,
}

/// Reduce per-run summaries into [`SimulationStatistics`].
///
/// `annualization` multiplies Sharpe and Sortino: 1.0 for per-trade returns,
/// `sqrt(trading days per year)` for per-day returns.
pub fn reduce_statistics(
    summaries: &[RunSummary],
    ruin_threshold_percent: f64,
    annualization: f64,
) -> SimulationStatistics {
    let n = summaries.len();
    if n == 0 {
        return SimulationStatistics::default();
    }
    let nf = n as f64;

    let mut returns = RunningMoments::new();
    let mut gross_profit = 0.0;
    let mut gross_loss = 0.0;
    let mut win_streaks: u64 = 0;
    let mut win_streak_total: u64 = 0;
    let mut loss_streaks: u64 = 0;
    let mut loss_streak_total: u64 = 0;
    let mut wins: u64 = 0;
    let mut trades: u64 = 0;

    // Sequential fold in run order keeps the floating-point result independent
    // of how the runs were scheduled.
    for s in summaries {
        returns.merge(&s.returns);
        gross_profit += s.gross_profit_r;
        gross_loss += s.gross_loss_r;
        win_streaks += u64::from(s.streaks.win_streaks);
        win_streak_total += s.streaks.win_streak_total;
        loss_streaks += u64::from(s.streaks.loss_streaks);
        loss_streak_total += s.streaks.loss_streak_total;
        wins += u64::from(s.wins);
        trades += u64::from(s.trades_taken);
    }

    let ratio = |num: u64, den: u64| if den == 0 { 0.0 } else { num as f64 / den as f64 };
    let collect = |f: &dyn Fn(&RunSummary) -> f64| summaries.iter().map(f).collect::<Vec<f64>>();

    let profitable = summaries.iter().filter(|s| s.final_balance > s.initial_balance).count();
    let ruined = summaries
        .iter()
        .filter(|s| s.breached_ruin(ruin_threshold_percent))
        .count();

    SimulationStatistics {
        simulation_count: n,
        final_r: PercentileSummary::from_values(collect(&|s| s.final_r)),
        final_balance: PercentileSummary::from_values(collect(&|s| s.final_balance as f64)),
        return_pct: PercentileSummary::from_values(collect(&|s| {
            s.net_profit() as f64 / s.initial_balance as f64 * 100.0
        })),
        profitable_pct: profitable as f64 / nf * 100.0,
        sharpe_ratio: sharpe_ratio(&returns, annualization),
        sortino_ratio: sortino_ratio(&returns, annualization),
        profit_factor: ProfitFactor::from_gross(gross_profit, gross_loss),
        max_drawdown_pct: DrawdownSummary::from_values(collect(&|s| s.max_drawdown_pct)),
        max_drawdown_amount: DrawdownSummary::from_values(collect(&|s| {
            s.max_drawdown_amount as f64
        })),
        max_drawdown_r: DrawdownSummary::from_values(collect(&|s| s.max_drawdown_r)),
        expected_max_win_streak: mean_f64(&collect(&|s| f64::from(s.streaks.longest_win))),
        expected_max_loss_streak: mean_f64(&collect(&|s| f64::from(s.streaks.longest_loss))),
        average_win_streak: ratio(win_streak_total, win_streaks),
        average_loss_streak: ratio(loss_streak_total, loss_streaks),
        observed_win_rate: ratio(wins, trades) * 100.0,
        average_trades: trades as f64 / nf,
        average_commission: mean_f64(&collect(&|s| s.total_commission as f64)),
        ruin_probability: ruined as f64 / nf,
        wiped_out_runs: summaries.iter().filter(|s| s.wiped_out).count(),
    }
}

// ─── Calendar statistics (daily mode) ───────────────────────────────

/// Daily-mode extras: time spent per mode and calendar-based ratios.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarStatistics {
    pub average_days_simulated: f64,
    pub average_loss_recovery_days: f64,
    pub average_gain_compounding_days: f64,
    pub average_skipped_weekly_days: f64,
    pub average_skipped_monthly_days: f64,
    /// Mean per-run compound annual return, in percent.
    pub mean_annualized_return_pct: f64,
    pub calmar_ratio: f64,
}

/// Reduce daily run summaries into [`CalendarStatistics`].
///
/// Calmar uses the mean annualized return over the median max drawdown.
pub fn reduce_calendar(
    summaries: &[DailyRunSummary],
    profile: &RiskManagementProfile,
) -> CalendarStatistics {
    let n = summaries.len();
    if n == 0 {
        return CalendarStatistics::default();
    }
    let avg = |f: &dyn Fn(&DailyRunSummary) -> u32| {
        summaries.iter().map(|s| f64::from(f(s))).sum::<f64>() / n as f64
    };

    let years = f64::from(profile.months_to_trade) / 12.0;
    let annualized: Vec<f64> = summaries
        .iter()
        .map(|s| {
            annualized_return(
                s.summary.initial_balance as f64,
                s.summary.final_balance as f64,
                years,
            )
        })
        .collect();
    let mean_annualized = mean_f64(&annualized);
    let drawdowns = sorted(summaries.iter().map(|s| s.summary.max_drawdown_pct).collect());
    let median_drawdown = median(&drawdowns) / 100.0;

    CalendarStatistics {
        average_days_simulated: avg(&|s| s.days_simulated),
        average_loss_recovery_days: avg(&|s| s.modes.loss_recovery),
        average_gain_compounding_days: avg(&|s| s.modes.gain_compounding),
        average_skipped_weekly_days: avg(&|s| s.modes.skipped_weekly),
        average_skipped_monthly_days: avg(&|s| s.modes.skipped_monthly),
        mean_annualized_return_pct: mean_annualized * 100.0,
        calmar_ratio: calmar_ratio(mean_annualized, median_drawdown),
    }
}
