//! Top-level entry point: request in, full Monte Carlo result out.
//!
//! ensemble (validates and checks the budget) → reduce → bucketize.

use std::sync::atomic::AtomicBool;

use edgesim_core::domain::{RiskManagementProfile, SimulationParams, SimulationRequest};
use edgesim_core::SimulationError;

use crate::buckets::bucketize;
use crate::ensemble::{run_daily_ensemble, run_per_trade_ensemble, EnsembleOptions};
use crate::result::{DailyResult, MonteCarloResult, PerTradeResult, SCHEMA_VERSION};
use crate::statistics::{reduce_calendar, reduce_statistics};

/// Run a Monte Carlo request.
///
/// Fails only on invalid parameters, an exceeded iteration budget, or
/// cancellation. Identical request, options and seed give an identical result.
pub fn run_monte_carlo(
    request: &SimulationRequest,
    options: &EnsembleOptions,
    cancel: Option<&AtomicBool>,
) -> Result<MonteCarloResult, SimulationError> {
    match request {
        SimulationRequest::PerTrade(params) => {
            run_per_trade(params, options, cancel).map(MonteCarloResult::PerTrade)
        }
        SimulationRequest::Daily(profile) => {
            run_daily(profile, options, cancel).map(MonteCarloResult::Daily)
        }
    }
}

pub fn run_per_trade(
    params: &SimulationParams,
    options: &EnsembleOptions,
    cancel: Option<&AtomicBool>,
) -> Result<PerTradeResult, SimulationError> {
    let ensemble = run_per_trade_ensemble(params, options, cancel)?;
    let statistics = reduce_statistics(&ensemble.summaries, params.ruin_threshold_percent, 1.0);
    let balances: Vec<f64> = ensemble
        .summaries
        .iter()
        .map(|s| s.final_balance as f64)
        .collect();

    Ok(PerTradeResult {
        schema_version: SCHEMA_VERSION,
        master_seed: options.master_seed,
        params: params.clone(),
        statistics,
        distribution_buckets: bucketize(&balances, options.bucket_count),
        sample_run: ensemble.sample_run,
    })
}

pub fn run_daily(
    profile: &RiskManagementProfile,
    options: &EnsembleOptions,
    cancel: Option<&AtomicBool>,
) -> Result<DailyResult, SimulationError> {
    let ensemble = run_daily_ensemble(profile, options, cancel)?;
    let summaries: Vec<_> = ensemble.summaries.iter().map(|s| s.summary.clone()).collect();
    let statistics = reduce_statistics(
        &summaries,
        profile.ruin_threshold_percent,
        profile.trading_days_per_year().sqrt(),
    );
    let calendar = reduce_calendar(&ensemble.summaries, profile);
    let balances: Vec<f64> = summaries.iter().map(|s| s.final_balance as f64).collect();

    Ok(DailyResult {
        schema_version: SCHEMA_VERSION,
        master_seed: options.master_seed,
        params: profile.clone(),
        statistics,
        calendar,
        distribution_buckets: bucketize(&balances, options.bucket_count),
        sample_run: ensemble.sample_run,
    })
}
