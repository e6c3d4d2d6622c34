use serde::{Deserialize, Serialize};

use super::params::Cents;

/// Classification of a single simulated trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeOutcome {
    Win,
    Loss,
    Breakeven,
}

/// One trade in a simulated sequence. Immutable once appended to a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedTrade {
    /// 1-based position within the run.
    pub trade_number: u32,
    pub outcome: TradeOutcome,
    /// `outcome == Win`, kept as a flat flag for consumers of the JSON export.
    pub is_win: bool,
    /// Gross R-result: `+reward_risk` for a win, `-1` for a loss, `0` for breakeven.
    pub r_result: f64,
    /// Commission charged on this trade, in R units.
    pub commission_r: f64,
    /// Realized change in balance, floored so the balance never goes negative.
    pub pnl: Cents,
    pub balance_after: Cents,
    /// Running sum of net R through this trade.
    pub cumulative_r: f64,
    /// Decline from the peak balance at this point, in percent.
    pub drawdown_pct: f64,
}

impl TradeOutcome {
    /// Label used in CSV output; matches the serde name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Loss => "loss",
            Self::Breakeven => "breakeven",
        }
    }
}

impl SimulatedTrade {
    /// R-result after commission.
    pub fn net_r(&self) -> f64 {
        self.r_result - self.commission_r
    }
}
