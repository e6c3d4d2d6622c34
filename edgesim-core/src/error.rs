//! Error types for parameter validation and simulation execution.

use thiserror::Error;

/// A parameter set failed a range check or the iteration budget.
///
/// Raised before any simulation work begins. Each variant names the violated
/// constraint and carries the offending value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("initial balance must be positive, got {0} cents")]
    NonPositiveBalance(i64),

    #[error("win rate must be within [0, 100], got {0}")]
    WinRateOutOfRange(f64),

    #[error("breakeven rate must be within [0, 1], got {0}")]
    BreakevenRateOutOfRange(f64),

    #[error("win rate {win_rate}% plus breakeven rate {breakeven_pct}% exceeds 100%")]
    OutcomeRatesExceedTotal { win_rate: f64, breakeven_pct: f64 },

    #[error("reward:risk ratio must be positive, got {0}")]
    NonPositiveRewardRisk(f64),

    #[error("risk per trade must be positive, got {0}")]
    NonPositiveRisk(f64),

    #[error("percentage risk per trade must not exceed 100, got {0}")]
    RiskPercentTooLarge(f64),

    #[error("commission must be non-negative, got {0}")]
    NegativeCommission(f64),

    #[error("number of trades must be at least 1")]
    ZeroTrades,

    #[error("simulation count must be at least 1")]
    ZeroSimulations,

    #[error("{field} must be at least 1")]
    ZeroCalendarField { field: &'static str },

    #[error("trading days per week must be within [1, 7], got {0}")]
    TradingDaysPerWeekOutOfRange(u32),

    #[error("{field} must be a positive limit, got {value}")]
    NonPositiveLimit { field: &'static str, value: f64 },

    #[error("{field} must be positive, got {value}")]
    NonPositiveMultiplier { field: &'static str, value: f64 },

    #[error("ruin threshold must be within [0, 100], got {0}")]
    RuinThresholdOutOfRange(f64),

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error(
        "iteration budget exceeded: {total} > {cap} \
         (max trades at this simulation count: {max_trades}, \
         max simulations at this trade count: {max_simulations})"
    )]
    BudgetExceeded {
        total: u64,
        cap: u64,
        max_trades: u64,
        max_simulations: u64,
    },
}

/// Errors surfaced by a Monte Carlo invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid parameters: {0}")]
    Validation(#[from] ValidationError),

    #[error("simulation cancelled after {completed} of {requested} runs")]
    Cancelled { completed: usize, requested: usize },
}
