//! Per-trade (V1) single-run simulator.

use crate::domain::{Recording, SimulatedRun, SimulationParams};
use crate::generator::EdgeModel;
use crate::moments::RunningMoments;
use crate::rng::UniformSource;

use super::accumulator::EquityAccumulator;

/// Simulate one run of exactly `number_of_trades` trades.
///
/// Position size is recomputed from the current balance for percentage risk
/// and held constant for fixed risk. The only early exit is a wipe-out: the
/// balance is floored at zero, or it is too small for the risk to round to a
/// whole cent.
pub fn simulate_trades<S: UniformSource + ?Sized>(
    params: &SimulationParams,
    source: &mut S,
    recording: Recording,
) -> SimulatedRun {
    let model = EdgeModel::from_params(params);
    let commission_r = params.commission_r();
    let mut acc = EquityAccumulator::new(params.initial_balance);
    let mut returns = RunningMoments::new();
    let mut trades = if recording.keeps_detail() {
        Vec::with_capacity(params.number_of_trades as usize)
    } else {
        Vec::new()
    };

    for _ in 0..params.number_of_trades {
        if acc.wiped_out() {
            break;
        }
        let risk = params.risk.risk_amount(acc.balance());
        if risk <= 0 {
            acc.mark_unfundable();
            break;
        }
        let commission = (risk as f64 * commission_r).round() as i64;
        let draw = model.draw(source, commission_r);
        let trade = acc.apply(&draw, risk, commission);
        returns.push(draw.net_r());
        if recording.keeps_detail() {
            trades.push(trade);
        }
    }

    SimulatedRun {
        summary: acc.finish(returns),
        trades,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RiskSizing, TradeOutcome};
    use crate::rng::{RngHierarchy, SequenceSource};

    fn params() -> SimulationParams {
        SimulationParams {
            initial_balance: 100_000,
            risk: RiskSizing::FixedAmount { cents: 1_000 },
            win_rate: 50.0,
            reward_risk_ratio: 2.0,
            number_of_trades: 4,
            commission_percent: 0.0,
            simulation_count: 1,
            ruin_threshold_percent: 0.0,
        }
    }

    #[test]
    fn scripted_sequence_produces_expected_balances() {
        let mut src = SequenceSource::new(vec![0.1, 0.9, 0.2, 0.8]);
        let run = simulate_trades(&params(), &mut src, Recording::Full);
        let balances: Vec<i64> = run.trades.iter().map(|t| t.balance_after).collect();
        assert_eq!(balances, vec![102_000, 101_000, 103_000, 102_000]);
        assert_eq!(run.summary.final_balance, 102_000);
        assert!((run.summary.final_r - 2.0).abs() < 1e-12);
        assert_eq!(run.summary.wins, 2);
        assert_eq!(run.summary.losses, 2);
        assert_eq!(run.trades[0].trade_number, 1);
        assert_eq!(run.trades[3].trade_number, 4);
    }

    #[test]
    fn percentage_risk_compounds() {
        let p = SimulationParams {
            risk: RiskSizing::PercentOfBalance { percent: 10.0 },
            number_of_trades: 2,
            ..params()
        };
        let mut src = SequenceSource::new(vec![0.1, 0.1]);
        let run = simulate_trades(&p, &mut src, Recording::Full);
        // 100_000 + 2 * 10_000 = 120_000; then + 2 * 12_000 = 144_000
        assert_eq!(run.trades[0].balance_after, 120_000);
        assert_eq!(run.trades[1].balance_after, 144_000);
    }

    #[test]
    fn commission_is_a_percentage_of_risk() {
        let p = SimulationParams {
            commission_percent: 10.0,
            number_of_trades: 1,
            ..params()
        };
        let mut src = SequenceSource::new(vec![0.9]);
        let run = simulate_trades(&p, &mut src, Recording::Full);
        let trade = &run.trades[0];
        assert_eq!(trade.outcome, TradeOutcome::Loss);
        assert_eq!(trade.pnl, -1_100);
        assert!((trade.net_r() + 1.1).abs() < 1e-12);
        assert_eq!(run.summary.total_commission, 100);
    }

    #[test]
    fn runs_exact_trade_count_without_ruin() {
        let p = SimulationParams {
            number_of_trades: 250,
            risk: RiskSizing::PercentOfBalance { percent: 1.0 },
            ..params()
        };
        let mut rng = RngHierarchy::new(11).rng_for("per_trade", 0);
        let run = simulate_trades(&p, &mut rng, Recording::Full);
        assert_eq!(run.trades.len(), 250);
        assert_eq!(run.summary.trades_taken, 250);
        assert_eq!(run.summary.returns.count, 250);
    }

    #[test]
    fn summary_only_keeps_no_trades() {
        let mut rng = RngHierarchy::new(11).rng_for("per_trade", 0);
        let run = simulate_trades(&params(), &mut rng, Recording::SummaryOnly);
        assert!(run.trades.is_empty());
        assert_eq!(run.summary.trades_taken, 4);
    }

    #[test]
    fn wipe_out_stops_the_run() {
        let p = SimulationParams {
            initial_balance: 2_500,
            risk: RiskSizing::FixedAmount { cents: 1_000 },
            number_of_trades: 10,
            ..params()
        };
        let mut src = SequenceSource::new(vec![0.9]);
        let run = simulate_trades(&p, &mut src, Recording::Full);
        assert_eq!(run.trades.len(), 3);
        assert_eq!(run.summary.final_balance, 0);
        assert!(run.summary.wiped_out);
        assert!(run.summary.breached_ruin(0.0));
    }

    #[test]
    fn balance_too_small_to_size_ends_run_without_credit() {
        let p = SimulationParams {
            initial_balance: 40,
            risk: RiskSizing::PercentOfBalance { percent: 1.0 },
            commission_percent: 5.0,
            win_rate: 100.0,
            number_of_trades: 10,
            ..params()
        };
        let mut src = SequenceSource::new(vec![0.1]);
        let run = simulate_trades(&p, &mut src, Recording::Full);
        assert!(run.trades.is_empty());
        assert_eq!(run.summary.final_r, 0.0);
        assert_eq!(run.summary.gross_profit_r, 0.0);
        assert_eq!(run.summary.final_balance, 40);
        assert!(run.summary.wiped_out);
        assert_eq!(src.consumed(), 0);
    }

    #[test]
    fn same_seed_same_run() {
        let p = SimulationParams {
            number_of_trades: 100,
            ..params()
        };
        let h = RngHierarchy::new(5);
        let a = simulate_trades(&p, &mut h.rng_for("per_trade", 2), Recording::Full);
        let b = simulate_trades(&p, &mut h.rng_for("per_trade", 2), Recording::Full);
        assert_eq!(a, b);
    }
}
