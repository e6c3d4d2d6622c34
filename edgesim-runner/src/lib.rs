//! EdgeSim Runner — Monte Carlo ensembles, statistics, histograms, artifacts.
//!
//! This crate builds on `edgesim-core` to provide:
//! - The ensemble runner (sequential or rayon-parallel, cooperative cancellation)
//! - The statistics reducer (percentiles, Sharpe/Sortino/Calmar, profit factor,
//!   streaks, ruin probability)
//! - The distribution bucketizer
//! - TOML configuration loading
//! - JSON / CSV / Markdown export and the artifact manager

pub mod buckets;
pub mod config;
pub mod ensemble;
pub mod export;
pub mod monte_carlo;
pub mod result;
pub mod statistics;

pub use buckets::{bucketize, DistributionBucket, DEFAULT_BUCKET_COUNT};
pub use config::{ConfigError, EnsembleSection, OutputSection, SimulationConfig};
pub use ensemble::{
    run_daily_ensemble, run_per_trade_ensemble, DailyEnsemble, EnsembleOptions,
    PerTradeEnsemble, DEFAULT_MASTER_SEED,
};
pub use export::{ArtifactManager, ArtifactPaths, RunManifest};
pub use monte_carlo::{run_daily, run_monte_carlo, run_per_trade};
pub use result::{DailyResult, MonteCarloResult, PerTradeResult, SCHEMA_VERSION};
pub use statistics::{
    CalendarStatistics, DrawdownSummary, PercentileSummary, ProfitFactor, SimulationStatistics,
};
