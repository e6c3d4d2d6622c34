//! Edge statistics supplied by a caller's trade history.
//!
//! The engine never reads trades or accounts. A caller that has aggregated a
//! journal hands over these numbers and gets pre-populated parameters back.

use serde::{Deserialize, Serialize};

use super::params::{Cents, RiskManagementProfile, RiskSizing, SimulationParams};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeStats {
    /// Percent of trades that won, 0–100.
    pub win_rate: f64,
    /// Mean winning R-multiple; becomes the reward:risk ratio.
    pub average_win_r: f64,
    /// Fraction of trades closed at breakeven, 0–1.
    #[serde(default)]
    pub breakeven_rate: f64,
    /// Commission drag as a percentage of the amount at risk.
    #[serde(default)]
    pub commission_percent: f64,
}

impl EdgeStats {
    /// Per-trade parameters seeded from this edge.
    pub fn to_params(
        &self,
        initial_balance: Cents,
        risk: RiskSizing,
        number_of_trades: u32,
        simulation_count: u32,
    ) -> SimulationParams {
        SimulationParams {
            initial_balance,
            risk,
            win_rate: self.win_rate,
            reward_risk_ratio: self.average_win_r,
            number_of_trades,
            commission_percent: self.commission_percent,
            simulation_count,
            ruin_threshold_percent: 0.0,
        }
    }

    /// Overlay this edge onto a profile, keeping its calendar and limits.
    ///
    /// Commission is converted to cents using the profile's risk at the
    /// initial balance.
    pub fn apply_to_profile(&self, base: &RiskManagementProfile) -> RiskManagementProfile {
        let risk = base.risk.risk_amount(base.initial_balance);
        let commission = (risk as f64 * self.commission_percent / 100.0).round() as Cents;
        RiskManagementProfile {
            win_rate: self.win_rate,
            reward_risk_ratio: self.average_win_r,
            breakeven_rate: self.breakeven_rate,
            commission_per_trade: commission,
            ..base.clone()
        }
    }
}
