//! Per-day (V2) single-run simulator.
//!
//! The calendar is `months_to_trade` months of `trading_days_per_month` days.
//! Weeks are consecutive blocks of `trading_days_per_week` days inside a month;
//! a partial final block is a short week. Each traded day takes up to
//! `max_trades_per_day` trades and stops early when a daily, weekly or monthly
//! loss limit is breached. A weekly breach skips the rest of the week, a
//! monthly breach the rest of the month.

use crate::domain::{
    Cents, DailyRun, DailyRunSummary, DayMode, ModeDays, Recording, RiskLimit,
    RiskManagementProfile, SimulatedDay,
};
use crate::generator::EdgeModel;
use crate::moments::RunningMoments;
use crate::rng::UniformSource;

use super::accumulator::EquityAccumulator;

/// Net result of a calendar period.
#[derive(Debug, Clone, Copy, Default)]
struct PeriodTally {
    pnl: Cents,
    r: f64,
    halted: bool,
}

impl PeriodTally {
    fn add(&mut self, pnl: Cents, r: f64) {
        self.pnl = self.pnl.saturating_add(pnl);
        self.r += r;
    }

    fn breaches(&self, limit: Option<&RiskLimit>) -> bool {
        limit.is_some_and(|l| l.breached(self.pnl, self.r))
    }
}

/// Simulate one run day by day.
pub fn simulate_days<S: UniformSource + ?Sized>(
    profile: &RiskManagementProfile,
    source: &mut S,
    recording: Recording,
) -> DailyRun {
    let model = EdgeModel::from_profile(profile);
    let mut acc = EquityAccumulator::new(profile.initial_balance);
    let mut day_returns = RunningMoments::new();
    let mut modes = ModeDays::default();
    let mut days = Vec::new();
    let mut day_number: u32 = 0;

    'calendar: for month in 0..profile.months_to_trade {
        let mut month_tally = PeriodTally::default();
        let mut week_tally = PeriodTally::default();
        let mut current_week = 0;

        for day_in_month in 0..profile.trading_days_per_month {
            if acc.wiped_out() {
                break 'calendar;
            }
            let week = day_in_month / profile.trading_days_per_week;
            if week != current_week {
                current_week = week;
                week_tally = PeriodTally::default();
            }
            day_number += 1;

            let mode = if month_tally.halted {
                DayMode::SkippedMonthlyLimit
            } else if week_tally.halted {
                DayMode::SkippedWeeklyLimit
            } else if acc.balance() < acc.peak_balance() {
                DayMode::LossRecovery
            } else {
                DayMode::GainCompounding
            };
            modes.record(mode);

            let mut day_tally = PeriodTally::default();
            let mut trades = Vec::new();

            if matches!(mode, DayMode::LossRecovery | DayMode::GainCompounding) {
                let multiplier = match mode {
                    DayMode::LossRecovery => profile.loss_recovery_risk_multiplier,
                    _ => profile.gain_compounding_risk_multiplier,
                };

                for _ in 0..profile.max_trades_per_day {
                    let base = profile.risk.risk_amount(acc.balance());
                    let risk = (base as f64 * multiplier).round() as Cents;
                    if risk <= 0 {
                        acc.mark_unfundable();
                        break;
                    }
                    let commission_r = profile.commission_per_trade as f64 / risk as f64;
                    let draw = model.draw(source, commission_r);
                    let trade = acc.apply(&draw, risk, profile.commission_per_trade);

                    let net_r = trade.net_r();
                    day_tally.add(trade.pnl, net_r);
                    week_tally.add(trade.pnl, net_r);
                    month_tally.add(trade.pnl, net_r);
                    if recording.keeps_detail() {
                        trades.push(trade);
                    }

                    if acc.wiped_out() {
                        break;
                    }
                    if month_tally.breaches(profile.max_loss_per_month.as_ref()) {
                        month_tally.halted = true;
                        break;
                    }
                    if week_tally.breaches(profile.max_loss_per_week.as_ref()) {
                        week_tally.halted = true;
                        break;
                    }
                    if day_tally.breaches(profile.max_loss_per_day.as_ref()) {
                        day_tally.halted = true;
                        break;
                    }
                }
            }

            day_returns.push(day_tally.r);

            if acc.wiped_out() {
                tracing::debug!(day = day_number, "run wiped out");
            }

            if recording.keeps_detail() {
                days.push(SimulatedDay {
                    day_number,
                    week_number: week + 1,
                    month_number: month + 1,
                    mode,
                    trades,
                    day_r: day_tally.r,
                    day_pnl: day_tally.pnl,
                    balance_after: acc.balance(),
                    drawdown_pct: acc.drawdown_pct(),
                    halted_by_daily_limit: day_tally.halted,
                });
            }
        }
    }

    DailyRun {
        summary: DailyRunSummary {
            summary: acc.finish(day_returns),
            modes,
            days_simulated: day_number,
        },
        days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskSizing;
    use crate::rng::{RngHierarchy, SequenceSource};

    fn profile() -> RiskManagementProfile {
        RiskManagementProfile {
            initial_balance: 1_000_000,
            risk: RiskSizing::FixedAmount { cents: 10_000 },
            win_rate: 50.0,
            reward_risk_ratio: 2.0,
            breakeven_rate: 0.0,
            commission_per_trade: 0,
            trading_days_per_week: 5,
            trading_days_per_month: 20,
            months_to_trade: 2,
            max_trades_per_day: 3,
            simulation_count: 1,
            ..RiskManagementProfile::default()
        }
    }

    fn always_lose() -> SequenceSource {
        SequenceSource::new(vec![0.99])
    }

    #[test]
    fn unlimited_profile_trades_every_day() {
        let mut rng = RngHierarchy::new(1).rng_for("daily", 0);
        let run = simulate_days(&profile(), &mut rng, Recording::Full);
        assert_eq!(run.summary.days_simulated, 40);
        assert_eq!(run.days.len(), 40);
        assert_eq!(run.summary.summary.trades_taken, 120);
        assert_eq!(run.summary.modes.total(), 40);
        assert_eq!(run.summary.modes.skipped_weekly, 0);
        assert_eq!(run.summary.modes.skipped_monthly, 0);
    }

    #[test]
    fn daily_limit_halts_the_day_only() {
        let p = RiskManagementProfile {
            max_loss_per_day: Some(RiskLimit::R { value: 2.0 }),
            months_to_trade: 1,
            ..profile()
        };
        let run = simulate_days(&p, &mut always_lose(), Recording::Full);
        assert!(run.days.iter().all(|d| d.trades.len() == 2));
        assert!(run.days.iter().all(|d| d.halted_by_daily_limit));
        assert_eq!(run.summary.summary.trades_taken, 40);
        assert_eq!(run.summary.modes.skipped_weekly, 0);
    }

    #[test]
    fn weekly_limit_skips_rest_of_week() {
        let p = RiskManagementProfile {
            max_loss_per_week: Some(RiskLimit::Currency { cents: 40_000 }),
            months_to_trade: 1,
            ..profile()
        };
        let run = simulate_days(&p, &mut always_lose(), Recording::Full);
        // Day 1: 3 losses (-30k). Day 2: 1 loss hits -40k. Days 3–5 skipped.
        let week1: Vec<DayMode> = run.days[..5].iter().map(|d| d.mode).collect();
        assert_eq!(&week1[2..], &[DayMode::SkippedWeeklyLimit; 3]);
        assert_eq!(run.days[1].trades.len(), 1);
        assert_eq!(run.days[5].week_number, 2);
        assert_ne!(run.days[5].mode, DayMode::SkippedWeeklyLimit);
        assert_eq!(run.summary.modes.skipped_weekly, 12);
        assert_eq!(run.summary.modes.total(), 20);
    }

    #[test]
    fn monthly_limit_skips_rest_of_month_and_resets() {
        let p = RiskManagementProfile {
            max_loss_per_month: Some(RiskLimit::R { value: 5.0 }),
            ..profile()
        };
        let run = simulate_days(&p, &mut always_lose(), Recording::Full);
        // Five losses: day 1 takes 3, day 2 takes 2 then halts the month.
        assert_eq!(run.summary.modes.skipped_monthly, 36);
        assert_eq!(run.days[20].month_number, 2);
        assert_eq!(run.days[20].trades.len(), 3);
        assert_eq!(run.summary.summary.trades_taken, 10);
        assert_eq!(run.summary.modes.total(), run.summary.days_simulated);
    }

    #[test]
    fn monthly_breach_takes_precedence_over_weekly() {
        let p = RiskManagementProfile {
            max_loss_per_week: Some(RiskLimit::R { value: 2.0 }),
            max_loss_per_month: Some(RiskLimit::R { value: 2.0 }),
            months_to_trade: 1,
            ..profile()
        };
        let run = simulate_days(&p, &mut always_lose(), Recording::Full);
        assert_eq!(run.summary.modes.skipped_monthly, 19);
        assert_eq!(run.summary.modes.skipped_weekly, 0);
    }

    #[test]
    fn modes_follow_high_water_mark() {
        let p = RiskManagementProfile {
            max_trades_per_day: 1,
            months_to_trade: 1,
            ..profile()
        };
        // win, lose, lose, win, win ...
        let mut src = SequenceSource::new(vec![0.1, 0.9, 0.9, 0.1, 0.1]);
        let run = simulate_days(&p, &mut src, Recording::Full);
        let modes: Vec<DayMode> = run.days[..5].iter().map(|d| d.mode).collect();
        assert_eq!(
            modes,
            vec![
                DayMode::GainCompounding,
                DayMode::GainCompounding,
                DayMode::LossRecovery,
                DayMode::LossRecovery,
                DayMode::LossRecovery,
            ]
        );
    }

    #[test]
    fn recovery_multiplier_scales_risk() {
        let p = RiskManagementProfile {
            max_trades_per_day: 1,
            months_to_trade: 1,
            loss_recovery_risk_multiplier: 0.5,
            ..profile()
        };
        let mut src = SequenceSource::new(vec![0.9, 0.9]);
        let run = simulate_days(&p, &mut src, Recording::Full);
        assert_eq!(run.days[0].day_pnl, -10_000);
        assert_eq!(run.days[1].mode, DayMode::LossRecovery);
        assert_eq!(run.days[1].day_pnl, -5_000);
    }

    #[test]
    fn commission_in_cents_converts_to_r() {
        let p = RiskManagementProfile {
            commission_per_trade: 500,
            max_trades_per_day: 1,
            months_to_trade: 1,
            ..profile()
        };
        let mut src = SequenceSource::new(vec![0.1]);
        let run = simulate_days(&p, &mut src, Recording::Full);
        let trade = &run.days[0].trades[0];
        assert!((trade.commission_r - 0.05).abs() < 1e-12);
        assert_eq!(trade.pnl, 19_500);
    }

    #[test]
    fn wipe_out_ends_calendar_early() {
        let p = RiskManagementProfile {
            initial_balance: 25_000,
            ..profile()
        };
        let run = simulate_days(&p, &mut always_lose(), Recording::Full);
        assert!(run.summary.summary.wiped_out);
        assert_eq!(run.summary.days_simulated, 1);
        assert_eq!(run.summary.modes.total(), 1);
        assert_eq!(run.summary.summary.final_balance, 0);
    }

    #[test]
    fn unfundable_risk_ends_run_without_phantom_r() {
        let p = RiskManagementProfile {
            initial_balance: 40,
            risk: RiskSizing::PercentOfBalance { percent: 1.0 },
            commission_per_trade: 5,
            win_rate: 100.0,
            max_loss_per_day: Some(RiskLimit::R { value: 0.5 }),
            ..profile()
        };
        let mut src = SequenceSource::new(vec![0.1]);
        let run = simulate_days(&p, &mut src, Recording::Full);
        let s = &run.summary.summary;
        assert!(s.wiped_out);
        assert_eq!(s.trades_taken, 0);
        assert_eq!(s.final_r, 0.0);
        assert_eq!(s.final_balance, 40);
        assert_eq!(s.total_commission, 0);
        assert_eq!(run.summary.days_simulated, 1);
        assert_eq!(run.days[0].day_r, 0.0);
        assert_eq!(src.consumed(), 0);
    }

    #[test]
    fn multiplier_rounding_to_zero_risk_stops_trading() {
        let p = RiskManagementProfile {
            risk: RiskSizing::FixedAmount { cents: 1 },
            gain_compounding_risk_multiplier: 0.4,
            ..profile()
        };
        let mut rng = RngHierarchy::new(4).rng_for("daily", 0);
        let run = simulate_days(&p, &mut rng, Recording::Full);
        assert!(run.summary.summary.wiped_out);
        assert_eq!(run.summary.summary.trades_taken, 0);
        assert_eq!(run.summary.summary.final_balance, p.initial_balance);
    }

    #[test]
    fn partial_week_at_month_end() {
        let p = RiskManagementProfile {
            trading_days_per_week: 5,
            trading_days_per_month: 22,
            months_to_trade: 1,
            ..profile()
        };
        let mut rng = RngHierarchy::new(2).rng_for("daily", 0);
        let run = simulate_days(&p, &mut rng, Recording::Full);
        assert_eq!(run.days[21].week_number, 5);
        assert_eq!(run.days[20].week_number, 5);
        assert_eq!(run.days[19].week_number, 4);
    }

    #[test]
    fn summary_only_keeps_no_days() {
        let mut rng = RngHierarchy::new(1).rng_for("daily", 0);
        let run = simulate_days(&profile(), &mut rng, Recording::SummaryOnly);
        assert!(run.days.is_empty());
        assert_eq!(run.summary.days_simulated, 40);
        assert_eq!(run.summary.summary.returns.count, 40);
    }
}
