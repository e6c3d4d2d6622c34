//! Iteration budget guard.
//!
//! An ensemble's cost is the number of trades it draws. Requests above the cap
//! are refused before any work starts, with the largest trade count and
//! simulation count that would fit alongside the caller's other choice.

use crate::domain::{RiskManagementProfile, SimulationParams};
use crate::error::ValidationError;

/// Cap on `number_of_trades * simulation_count` for per-trade requests.
pub const SIMULATION_BUDGET_CAP: u64 = 10_000_000;

/// Cap on `max_trades_per_day * trading_days_per_month * months_to_trade *
/// simulation_count` for daily requests.
pub const DAILY_SIMULATION_BUDGET_CAP: u64 = 10_000_000;

/// Check `trades_per_run * simulations` against `cap`.
///
/// Returns the total iteration count on success.
pub fn check_budget(trades_per_run: u64, simulations: u64, cap: u64) -> Result<u64, ValidationError> {
    let total = trades_per_run.saturating_mul(simulations);
    if total <= cap {
        tracing::debug!(total, cap, "iteration budget ok");
        return Ok(total);
    }
    let max_trades = if simulations == 0 { cap } else { cap / simulations };
    let max_simulations = if trades_per_run == 0 { cap } else { cap / trades_per_run };
    tracing::warn!(total, cap, max_trades, max_simulations, "iteration budget exceeded");
    Err(ValidationError::BudgetExceeded {
        total,
        cap,
        max_trades,
        max_simulations,
    })
}

pub fn check_per_trade(params: &SimulationParams) -> Result<u64, ValidationError> {
    check_budget(
        u64::from(params.number_of_trades),
        u64::from(params.simulation_count),
        SIMULATION_BUDGET_CAP,
    )
}

/// For daily requests `max_trades` in the error is a per-day figure: the
/// largest `max_trades_per_day` that fits at the requested calendar and
/// simulation count.
pub fn check_daily(profile: &RiskManagementProfile) -> Result<u64, ValidationError> {
    let cap = DAILY_SIMULATION_BUDGET_CAP;
    let days = profile.total_days();
    let simulations = u64::from(profile.simulation_count);
    let trades_per_run = u64::from(profile.max_trades_per_day).saturating_mul(days);
    let total = trades_per_run.saturating_mul(simulations);
    if total <= cap {
        tracing::debug!(total, cap, "iteration budget ok");
        return Ok(total);
    }
    let day_runs = days.saturating_mul(simulations);
    let max_trades = if day_runs == 0 { cap } else { cap / day_runs };
    let max_simulations = if trades_per_run == 0 { cap } else { cap / trades_per_run };
    tracing::warn!(total, cap, max_trades, max_simulations, "iteration budget exceeded");
    Err(ValidationError::BudgetExceeded {
        total,
        cap,
        max_trades,
        max_simulations,
    })
}
