//! Per-run outputs: terminal summaries for every run, full sequences for the
//! one retained sample run.

use serde::{Deserialize, Serialize};

use super::params::Cents;
use super::trade::SimulatedTrade;
use crate::moments::RunningMoments;

/// Streak bookkeeping for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub longest_win: u32,
    pub longest_loss: u32,
    /// Number of completed win streaks and their summed lengths.
    pub win_streaks: u32,
    pub win_streak_total: u64,
    pub loss_streaks: u32,
    pub loss_streak_total: u64,
}

/// Terminal scalars of one Monte Carlo sample. Kept for every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub initial_balance: Cents,
    pub final_balance: Cents,
    /// Sum of net R over all trades.
    pub final_r: f64,
    pub total_commission: Cents,
    pub peak_balance: Cents,
    pub min_balance: Cents,
    /// Largest decline from peak, in percent.
    pub max_drawdown_pct: f64,
    pub max_drawdown_amount: Cents,
    pub max_drawdown_r: f64,
    pub trades_taken: u32,
    pub wins: u32,
    pub losses: u32,
    pub breakevens: u32,
    /// Sum of positive net R.
    pub gross_profit_r: f64,
    /// Sum of |negative net R|.
    pub gross_loss_r: f64,
    pub streaks: StreakSummary,
    /// Moments of the per-period return series (per trade in V1, per day in V2).
    pub returns: RunningMoments,
    /// Balance reached zero, or became too small to size a position, and the
    /// run stopped early.
    pub wiped_out: bool,
}

impl RunSummary {
    pub fn net_profit(&self) -> Cents {
        self.final_balance - self.initial_balance
    }

    /// At or below `threshold_percent` of the initial balance at any point.
    pub fn breached_ruin(&self, threshold_percent: f64) -> bool {
        if self.wiped_out {
            return true;
        }
        let line = self.initial_balance as f64 * threshold_percent / 100.0;
        (self.min_balance as f64) <= line
    }
}

/// A per-trade (V1) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedRun {
    pub summary: RunSummary,
    /// Empty unless the run was recorded in full.
    pub trades: Vec<SimulatedTrade>,
}

/// Which regime a simulated day ran under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayMode {
    /// Day started below the high-water mark.
    LossRecovery,
    /// Day started at the high-water mark.
    GainCompounding,
    SkippedWeeklyLimit,
    SkippedMonthlyLimit,
}

impl DayMode {
    /// Label used in CSV output; matches the serde name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LossRecovery => "loss_recovery",
            Self::GainCompounding => "gain_compounding",
            Self::SkippedWeeklyLimit => "skipped_weekly_limit",
            Self::SkippedMonthlyLimit => "skipped_monthly_limit",
        }
    }
}

/// Day counts per mode. Always sums to the number of simulated days.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDays {
    pub loss_recovery: u32,
    pub gain_compounding: u32,
    pub skipped_weekly: u32,
    pub skipped_monthly: u32,
}

impl ModeDays {
    pub fn record(&mut self, mode: DayMode) {
        match mode {
            DayMode::LossRecovery => self.loss_recovery += 1,
            DayMode::GainCompounding => self.gain_compounding += 1,
            DayMode::SkippedWeeklyLimit => self.skipped_weekly += 1,
            DayMode::SkippedMonthlyLimit => self.skipped_monthly += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.loss_recovery + self.gain_compounding + self.skipped_weekly + self.skipped_monthly
    }
}

/// One trading day of a V2 run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedDay {
    /// 1-based across the whole run.
    pub day_number: u32,
    /// 1-based within the month.
    pub week_number: u32,
    pub month_number: u32,
    pub mode: DayMode,
    pub trades: Vec<SimulatedTrade>,
    pub day_r: f64,
    pub day_pnl: Cents,
    pub balance_after: Cents,
    pub drawdown_pct: f64,
    pub halted_by_daily_limit: bool,
}

/// Terminal scalars of a V2 run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRunSummary {
    pub summary: RunSummary,
    pub modes: ModeDays,
    pub days_simulated: u32,
}

/// A per-day (V2) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRun {
    pub summary: DailyRunSummary,
    /// Empty unless the run was recorded in full.
    pub days: Vec<SimulatedDay>,
}

/// Whether a simulator keeps the full trade/day sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recording {
    Full,
    SummaryOnly,
}

impl Recording {
    pub fn keeps_detail(self) -> bool {
        self == Self::Full
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(min_balance: Cents, wiped_out: bool) -> RunSummary {
        RunSummary {
            initial_balance: 100_000,
            final_balance: min_balance,
            final_r: 0.0,
            total_commission: 0,
            peak_balance: 100_000,
            min_balance,
            max_drawdown_pct: 0.0,
            max_drawdown_amount: 0,
            max_drawdown_r: 0.0,
            trades_taken: 0,
            wins: 0,
            losses: 0,
            breakevens: 0,
            gross_profit_r: 0.0,
            gross_loss_r: 0.0,
            streaks: StreakSummary::default(),
            returns: RunningMoments::default(),
            wiped_out,
        }
    }

    #[test]
    fn ruin_line_is_inclusive() {
        assert!(summary(50_000, false).breached_ruin(50.0));
        assert!(!summary(50_001, false).breached_ruin(50.0));
    }

    #[test]
    fn wipe_out_is_always_ruin() {
        assert!(summary(0, true).breached_ruin(0.0));
    }

    #[test]
    fn mode_labels_match_serde_names() {
        for mode in [
            DayMode::LossRecovery,
            DayMode::GainCompounding,
            DayMode::SkippedWeeklyLimit,
            DayMode::SkippedMonthlyLimit,
        ] {
            assert_eq!(serde_json::to_value(mode).unwrap(), mode.as_str());
        }
    }

    #[test]
    fn mode_days_total() {
        let mut modes = ModeDays::default();
        for mode in [
            DayMode::LossRecovery,
            DayMode::GainCompounding,
            DayMode::GainCompounding,
            DayMode::SkippedWeeklyLimit,
            DayMode::SkippedMonthlyLimit,
        ] {
            modes.record(mode);
        }
        assert_eq!(modes.total(), 5);
        assert_eq!(modes.gain_compounding, 2);
    }
}
