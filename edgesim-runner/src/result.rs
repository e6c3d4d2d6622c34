//! Monte Carlo result types.
//!
//! The per-trade and daily results are separate variants of one tagged enum,
//! so calendar statistics only exist where a calendar was simulated.

use serde::{Deserialize, Serialize};

use edgesim_core::domain::{DailyRun, RiskManagementProfile, SimulatedRun, SimulationParams};

use crate::buckets::DistributionBucket;
use crate::statistics::{CalendarStatistics, SimulationStatistics};

/// Current schema version for persisted results.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Result of a per-trade (V1) ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerTradeResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub master_seed: u64,
    pub params: SimulationParams,
    pub statistics: SimulationStatistics,
    pub distribution_buckets: Vec<DistributionBucket>,
    pub sample_run: SimulatedRun,
}

/// Result of a daily (V2) ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub master_seed: u64,
    pub params: RiskManagementProfile,
    pub statistics: SimulationStatistics,
    pub calendar: CalendarStatistics,
    pub distribution_buckets: Vec<DistributionBucket>,
    pub sample_run: DailyRun,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MonteCarloResult {
    PerTrade(PerTradeResult),
    Daily(DailyResult),
}

impl MonteCarloResult {
    pub fn schema_version(&self) -> u32 {
        match self {
            Self::PerTrade(r) => r.schema_version,
            Self::Daily(r) => r.schema_version,
        }
    }

    pub fn master_seed(&self) -> u64 {
        match self {
            Self::PerTrade(r) => r.master_seed,
            Self::Daily(r) => r.master_seed,
        }
    }

    pub fn statistics(&self) -> &SimulationStatistics {
        match self {
            Self::PerTrade(r) => &r.statistics,
            Self::Daily(r) => &r.statistics,
        }
    }

    pub fn distribution_buckets(&self) -> &[DistributionBucket] {
        match self {
            Self::PerTrade(r) => &r.distribution_buckets,
            Self::Daily(r) => &r.distribution_buckets,
        }
    }

    pub fn initial_balance(&self) -> i64 {
        match self {
            Self::PerTrade(r) => r.params.initial_balance,
            Self::Daily(r) => r.params.initial_balance,
        }
    }

    /// `"per_trade"` or `"daily"`.
    pub fn mode(&self) -> &'static str {
        match self {
            Self::PerTrade(_) => "per_trade",
            Self::Daily(_) => "daily",
        }
    }
}
