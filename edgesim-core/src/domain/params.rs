//! Simulation inputs: per-trade (V1) parameters and the per-day (V2) risk
//! management profile, plus the tagged request that selects between them.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Money in minor currency units (cents).
pub type Cents = i64;

/// How the amount at risk on each trade is derived.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RiskSizing {
    /// Percentage of the current balance (compounding).
    PercentOfBalance { percent: f64 },

    /// Fixed amount per trade regardless of balance.
    FixedAmount { cents: Cents },
}

impl RiskSizing {
    /// Amount at risk for a trade taken at `balance`.
    pub fn risk_amount(&self, balance: Cents) -> Cents {
        match *self {
            Self::PercentOfBalance { percent } => {
                (balance.max(0) as f64 * percent / 100.0).round() as Cents
            }
            Self::FixedAmount { cents } => cents,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            Self::PercentOfBalance { percent } => {
                if !percent.is_finite() {
                    return Err(ValidationError::NotFinite { field: "risk percent" });
                }
                if percent <= 0.0 {
                    return Err(ValidationError::NonPositiveRisk(percent));
                }
                if percent > 100.0 {
                    return Err(ValidationError::RiskPercentTooLarge(percent));
                }
            }
            Self::FixedAmount { cents } => {
                if cents <= 0 {
                    return Err(ValidationError::NonPositiveRisk(cents as f64));
                }
            }
        }
        Ok(())
    }
}

/// A loss limit expressed in R-multiples or in currency.
///
/// A limit is breached once the period's net result is at or below the
/// negated limit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RiskLimit {
    R { value: f64 },
    Currency { cents: Cents },
}

impl RiskLimit {
    pub fn breached(&self, period_pnl: Cents, period_r: f64) -> bool {
        match *self {
            Self::R { value } => period_r <= -value,
            Self::Currency { cents } => period_pnl <= -cents,
        }
    }

    fn validate(&self, field: &'static str) -> Result<(), ValidationError> {
        let value = match *self {
            Self::R { value } => value,
            Self::Currency { cents } => cents as f64,
        };
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field });
        }
        if value <= 0.0 {
            return Err(ValidationError::NonPositiveLimit { field, value });
        }
        Ok(())
    }
}

/// Per-trade (V1) simulation parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationParams {
    pub initial_balance: Cents,
    pub risk: RiskSizing,
    /// Win rate in percent, 0–100.
    pub win_rate: f64,
    pub reward_risk_ratio: f64,
    pub number_of_trades: u32,
    /// Commission per trade as a percentage of the amount at risk.
    #[serde(default)]
    pub commission_percent: f64,
    pub simulation_count: u32,
    /// Ruin line as a percentage of the initial balance.
    #[serde(default)]
    pub ruin_threshold_percent: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            initial_balance: 1_000_000,
            risk: RiskSizing::PercentOfBalance { percent: 1.0 },
            win_rate: 50.0,
            reward_risk_ratio: 2.0,
            number_of_trades: 100,
            commission_percent: 0.0,
            simulation_count: 1_000,
            ruin_threshold_percent: 0.0,
        }
    }
}

impl SimulationParams {
    /// Range checks. The iteration budget is checked separately by
    /// [`crate::budget::check_per_trade`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.initial_balance <= 0 {
            return Err(ValidationError::NonPositiveBalance(self.initial_balance));
        }
        self.risk.validate()?;
        validate_win_rate(self.win_rate)?;
        validate_reward_risk(self.reward_risk_ratio)?;
        if !self.commission_percent.is_finite() {
            return Err(ValidationError::NotFinite { field: "commission percent" });
        }
        if self.commission_percent < 0.0 {
            return Err(ValidationError::NegativeCommission(self.commission_percent));
        }
        if self.number_of_trades == 0 {
            return Err(ValidationError::ZeroTrades);
        }
        if self.simulation_count == 0 {
            return Err(ValidationError::ZeroSimulations);
        }
        validate_ruin_threshold(self.ruin_threshold_percent)
    }

    /// Commission per trade in R units.
    pub fn commission_r(&self) -> f64 {
        self.commission_percent / 100.0
    }
}

/// Per-day (V2) risk management profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskManagementProfile {
    pub initial_balance: Cents,
    pub risk: RiskSizing,
    /// Win rate in percent, 0–100.
    pub win_rate: f64,
    pub reward_risk_ratio: f64,
    /// Fraction of trades that neither win nor lose, 0–1.
    #[serde(default)]
    pub breakeven_rate: f64,
    /// Commission per trade in cents.
    #[serde(default)]
    pub commission_per_trade: Cents,
    pub trading_days_per_week: u32,
    pub trading_days_per_month: u32,
    pub months_to_trade: u32,
    pub max_trades_per_day: u32,
    #[serde(default)]
    pub max_loss_per_day: Option<RiskLimit>,
    #[serde(default)]
    pub max_loss_per_week: Option<RiskLimit>,
    #[serde(default)]
    pub max_loss_per_month: Option<RiskLimit>,
    /// Applied to the base risk on days that start below the high-water mark.
    #[serde(default = "unit_multiplier")]
    pub loss_recovery_risk_multiplier: f64,
    /// Applied to the base risk on days that start at the high-water mark.
    #[serde(default = "unit_multiplier")]
    pub gain_compounding_risk_multiplier: f64,
    #[serde(default)]
    pub ruin_threshold_percent: f64,
    pub simulation_count: u32,
}

fn unit_multiplier() -> f64 {
    1.0
}

impl Default for RiskManagementProfile {
    fn default() -> Self {
        Self {
            initial_balance: 1_000_000,
            risk: RiskSizing::PercentOfBalance { percent: 1.0 },
            win_rate: 50.0,
            reward_risk_ratio: 2.0,
            breakeven_rate: 0.0,
            commission_per_trade: 0,
            trading_days_per_week: 5,
            trading_days_per_month: 21,
            months_to_trade: 12,
            max_trades_per_day: 3,
            max_loss_per_day: None,
            max_loss_per_week: None,
            max_loss_per_month: None,
            loss_recovery_risk_multiplier: 1.0,
            gain_compounding_risk_multiplier: 1.0,
            ruin_threshold_percent: 0.0,
            simulation_count: 1_000,
        }
    }
}

impl RiskManagementProfile {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.initial_balance <= 0 {
            return Err(ValidationError::NonPositiveBalance(self.initial_balance));
        }
        self.risk.validate()?;
        validate_win_rate(self.win_rate)?;
        validate_reward_risk(self.reward_risk_ratio)?;
        if !self.breakeven_rate.is_finite() {
            return Err(ValidationError::NotFinite { field: "breakeven rate" });
        }
        if !(0.0..=1.0).contains(&self.breakeven_rate) {
            return Err(ValidationError::BreakevenRateOutOfRange(self.breakeven_rate));
        }
        let breakeven_pct = self.breakeven_rate * 100.0;
        if self.win_rate + breakeven_pct > 100.0 + 1e-9 {
            return Err(ValidationError::OutcomeRatesExceedTotal {
                win_rate: self.win_rate,
                breakeven_pct,
            });
        }
        if self.commission_per_trade < 0 {
            return Err(ValidationError::NegativeCommission(
                self.commission_per_trade as f64,
            ));
        }
        if !(1..=7).contains(&self.trading_days_per_week) {
            return Err(ValidationError::TradingDaysPerWeekOutOfRange(
                self.trading_days_per_week,
            ));
        }
        for (field, value) in [
            ("trading days per month", self.trading_days_per_month),
            ("months to trade", self.months_to_trade),
            ("max trades per day", self.max_trades_per_day),
        ] {
            if value == 0 {
                return Err(ValidationError::ZeroCalendarField { field });
            }
        }
        if self.simulation_count == 0 {
            return Err(ValidationError::ZeroSimulations);
        }
        for (field, limit) in [
            ("max loss per day", &self.max_loss_per_day),
            ("max loss per week", &self.max_loss_per_week),
            ("max loss per month", &self.max_loss_per_month),
        ] {
            if let Some(limit) = limit {
                limit.validate(field)?;
            }
        }
        for (field, value) in [
            ("loss recovery risk multiplier", self.loss_recovery_risk_multiplier),
            ("gain compounding risk multiplier", self.gain_compounding_risk_multiplier),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NotFinite { field });
            }
            if value <= 0.0 {
                return Err(ValidationError::NonPositiveMultiplier { field, value });
            }
        }
        validate_ruin_threshold(self.ruin_threshold_percent)
    }

    /// Loss rate in percent, derived so the three outcome rates sum to 100.
    pub fn loss_rate(&self) -> f64 {
        (100.0 - self.win_rate - self.breakeven_rate * 100.0).max(0.0)
    }

    /// Calendar length of one run in trading days.
    pub fn total_days(&self) -> u64 {
        u64::from(self.trading_days_per_month) * u64::from(self.months_to_trade)
    }

    /// Trading days in a year under this calendar.
    pub fn trading_days_per_year(&self) -> f64 {
        f64::from(self.trading_days_per_month) * 12.0
    }
}

/// A Monte Carlo request: either per-trade (V1) or per-day (V2).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SimulationRequest {
    PerTrade(SimulationParams),
    Daily(RiskManagementProfile),
}

impl SimulationRequest {
    pub fn simulation_count(&self) -> u32 {
        match self {
            Self::PerTrade(p) => p.simulation_count,
            Self::Daily(p) => p.simulation_count,
        }
    }

    /// Range checks followed by the iteration budget.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::PerTrade(p) => {
                p.validate()?;
                crate::budget::check_per_trade(p)?;
            }
            Self::Daily(p) => {
                p.validate()?;
                crate::budget::check_daily(p)?;
            }
        }
        Ok(())
    }
}

fn validate_win_rate(win_rate: f64) -> Result<(), ValidationError> {
    if !win_rate.is_finite() {
        return Err(ValidationError::NotFinite { field: "win rate" });
    }
    if !(0.0..=100.0).contains(&win_rate) {
        return Err(ValidationError::WinRateOutOfRange(win_rate));
    }
    Ok(())
}

fn validate_reward_risk(ratio: f64) -> Result<(), ValidationError> {
    if !ratio.is_finite() {
        return Err(ValidationError::NotFinite { field: "reward:risk ratio" });
    }
    if ratio <= 0.0 {
        return Err(ValidationError::NonPositiveRewardRisk(ratio));
    }
    Ok(())
}

fn validate_ruin_threshold(pct: f64) -> Result<(), ValidationError> {
    if !pct.is_finite() {
        return Err(ValidationError::NotFinite { field: "ruin threshold" });
    }
    if !(0.0..=100.0).contains(&pct) {
        return Err(ValidationError::RuinThresholdOutOfRange(pct));
    }
    Ok(())
}
