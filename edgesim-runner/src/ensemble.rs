//! Ensemble runner — the Monte Carlo loop.
//!
//! Run `i` draws from the RNG stream `(master_seed, stream, i)`, so a run's
//! outcome does not depend on which thread executed it or when. Run 0 is
//! recorded in full as the sample run; every other run keeps only its
//! summary, bounding memory at O(simulation_count).

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use edgesim_core::domain::{
    DailyRun, DailyRunSummary, Recording, RiskManagementProfile, RunSummary, SimulatedRun,
    SimulationParams,
};
use edgesim_core::{
    check_daily, check_per_trade, simulate_days, simulate_trades, RngHierarchy, SimulationError,
};

use crate::buckets::DEFAULT_BUCKET_COUNT;

/// RNG stream label for per-trade runs.
pub const PER_TRADE_STREAM: &str = "per_trade";
/// RNG stream label for daily runs.
pub const DAILY_STREAM: &str = "daily";

/// Master seed used when the caller does not pick one.
pub const DEFAULT_MASTER_SEED: u64 = 42;

/// How an ensemble is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnsembleOptions {
    pub master_seed: u64,
    /// Worker threads. 0 or 1 runs sequentially on the calling thread.
    pub threads: usize,
    pub bucket_count: usize,
}

impl Default for EnsembleOptions {
    fn default() -> Self {
        Self {
            master_seed: DEFAULT_MASTER_SEED,
            threads: 1,
            bucket_count: DEFAULT_BUCKET_COUNT,
        }
    }
}

/// Summaries of every per-trade run plus run 0 in full.
#[derive(Debug, Clone, PartialEq)]
pub struct PerTradeEnsemble {
    pub summaries: Vec<RunSummary>,
    pub sample_run: SimulatedRun,
}

/// Summaries of every daily run plus run 0 in full.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyEnsemble {
    pub summaries: Vec<DailyRunSummary>,
    pub sample_run: DailyRun,
}

fn recording_for(index: usize) -> Recording {
    if index == 0 {
        Recording::Full
    } else {
        Recording::SummaryOnly
    }
}

fn is_cancelled(cancel: Option<&AtomicBool>) -> bool {
    cancel.is_some_and(|f| f.load(Ordering::Relaxed))
}

/// Execute `count` runs in run-index order, sequentially or on a rayon pool.
///
/// The cancel flag is checked before each run. A cancelled ensemble returns
/// [`SimulationError::Cancelled`] with the number of runs that finished.
fn execute<T, F>(
    count: usize,
    threads: usize,
    cancel: Option<&AtomicBool>,
    run: F,
) -> Result<Vec<T>, SimulationError>
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    let thread_pool = if threads > 1 {
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => Some(pool),
            Err(e) => {
                tracing::warn!(error = %e, "failed to build thread pool, running sequentially");
                None
            }
        }
    } else {
        None
    };

    let results: Vec<Option<T>> = if let Some(ref tp) = thread_pool {
        tp.install(|| {
            (0..count)
                .into_par_iter()
                .map(|i| if is_cancelled(cancel) { None } else { Some(run(i)) })
                .collect()
        })
    } else {
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            if is_cancelled(cancel) {
                tracing::warn!(completed = i, requested = count, "ensemble cancelled");
                return Err(SimulationError::Cancelled {
                    completed: i,
                    requested: count,
                });
            }
            out.push(Some(run(i)));
        }
        out
    };

    let completed = results.iter().filter(|r| r.is_some()).count();
    if completed < count {
        tracing::warn!(completed, requested = count, "ensemble cancelled");
        return Err(SimulationError::Cancelled {
            completed,
            requested: count,
        });
    }
    Ok(results.into_iter().flatten().collect())
}

/// Run the per-trade (V1) ensemble.
///
/// Validates the parameters and the iteration budget before drawing anything.
pub fn run_per_trade_ensemble(
    params: &SimulationParams,
    options: &EnsembleOptions,
    cancel: Option<&AtomicBool>,
) -> Result<PerTradeEnsemble, SimulationError> {
    params.validate()?;
    check_per_trade(params)?;

    let count = params.simulation_count as usize;
    let span = tracing::info_span!(
        "ensemble",
        mode = PER_TRADE_STREAM,
        runs = count,
        seed = options.master_seed
    );
    let _guard = span.enter();
    let start = Instant::now();
    tracing::info!(threads = options.threads, trades = params.number_of_trades, "ensemble started");

    let hierarchy = RngHierarchy::new(options.master_seed);
    let runs = execute(count, options.threads, cancel, |i| {
        let mut rng = hierarchy.rng_for(PER_TRADE_STREAM, i as u64);
        let run = simulate_trades(params, &mut rng, recording_for(i));
        if run.summary.wiped_out {
            tracing::debug!(run = i, trades = run.summary.trades_taken, "run wiped out");
        }
        run
    })?;

    let mut runs = runs.into_iter();
    let sample_run = runs.next().ok_or(SimulationError::Cancelled {
        completed: 0,
        requested: count,
    })?;
    let mut summaries = Vec::with_capacity(count);
    summaries.push(sample_run.summary.clone());
    summaries.extend(runs.map(|r| r.summary));

    tracing::info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        "ensemble finished"
    );
    Ok(PerTradeEnsemble {
        summaries,
        sample_run,
    })
}

/// Run the daily (V2) ensemble.
///
/// Validates the profile and the iteration budget before drawing anything.
pub fn run_daily_ensemble(
    profile: &RiskManagementProfile,
    options: &EnsembleOptions,
    cancel: Option<&AtomicBool>,
) -> Result<DailyEnsemble, SimulationError> {
    profile.validate()?;
    check_daily(profile)?;

    let count = profile.simulation_count as usize;
    let span = tracing::info_span!(
        "ensemble",
        mode = DAILY_STREAM,
        runs = count,
        seed = options.master_seed
    );
    let _guard = span.enter();
    let start = Instant::now();
    tracing::info!(
        threads = options.threads,
        days = profile.total_days(),
        trades_per_day = profile.max_trades_per_day,
        "ensemble started"
    );

    let hierarchy = RngHierarchy::new(options.master_seed);
    let runs = execute(count, options.threads, cancel, |i| {
        let mut rng = hierarchy.rng_for(DAILY_STREAM, i as u64);
        simulate_days(profile, &mut rng, recording_for(i))
    })?;

    let mut runs = runs.into_iter();
    let sample_run = runs.next().ok_or(SimulationError::Cancelled {
        completed: 0,
        requested: count,
    })?;
    let mut summaries = Vec::with_capacity(count);
    summaries.push(sample_run.summary.clone());
    summaries.extend(runs.map(|r| r.summary));

    tracing::info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        "ensemble finished"
    );
    Ok(DailyEnsemble {
        summaries,
        sample_run,
    })
}
