//! Random trade generator.
//!
//! A single uniform draw `u` is mapped onto consecutive probability intervals:
//! `[0, win)` is a win, `[win, win + breakeven)` is breakeven, the rest is a
//! loss. Wins pay `+reward_risk`, losses cost `-1`, breakevens `0`; commission
//! is charged on every outcome.

use crate::domain::{RiskManagementProfile, SimulationParams, TradeOutcome};
use crate::rng::UniformSource;

/// Outcome probabilities and payoff of a trading edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeModel {
    /// Probability of a win, 0–1.
    pub win_probability: f64,
    /// Probability of breakeven, 0–1.
    pub breakeven_probability: f64,
    pub reward_risk_ratio: f64,
}

/// A drawn trade before it is applied to a balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeDraw {
    pub outcome: TradeOutcome,
    pub r_result: f64,
    pub commission_r: f64,
}

impl TradeDraw {
    pub fn net_r(&self) -> f64 {
        self.r_result - self.commission_r
    }
}

impl EdgeModel {
    pub fn from_params(params: &SimulationParams) -> Self {
        Self {
            win_probability: params.win_rate / 100.0,
            breakeven_probability: 0.0,
            reward_risk_ratio: params.reward_risk_ratio,
        }
    }

    pub fn from_profile(profile: &RiskManagementProfile) -> Self {
        Self {
            win_probability: profile.win_rate / 100.0,
            breakeven_probability: profile.breakeven_rate,
            reward_risk_ratio: profile.reward_risk_ratio,
        }
    }

    pub fn classify(&self, u: f64) -> TradeOutcome {
        if u < self.win_probability {
            TradeOutcome::Win
        } else if u < self.win_probability + self.breakeven_probability {
            TradeOutcome::Breakeven
        } else {
            TradeOutcome::Loss
        }
    }

    pub fn r_result(&self, outcome: TradeOutcome) -> f64 {
        match outcome {
            TradeOutcome::Win => self.reward_risk_ratio,
            TradeOutcome::Loss => -1.0,
            TradeOutcome::Breakeven => 0.0,
        }
    }

    /// Draw one trade. Consumes exactly one uniform from `source`.
    pub fn draw<S: UniformSource + ?Sized>(&self, source: &mut S, commission_r: f64) -> TradeDraw {
        let outcome = self.classify(source.next_uniform());
        TradeDraw {
            outcome,
            r_result: self.r_result(outcome),
            commission_r,
        }
    }
}
