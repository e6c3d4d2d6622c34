//! EdgeSim Core — trade-sequence simulation engine.
//!
//! This crate contains everything a single Monte Carlo sample needs:
//! - Domain types (per-trade params, daily risk profile, trades, runs)
//! - An injectable uniform random source and a BLAKE3-seeded RNG hierarchy
//! - The random trade generator (win / breakeven / loss intervals)
//! - Per-trade (V1) and per-day (V2) single-run simulators
//! - Mergeable running moments for return series
//! - Parameter validation and the iteration budget guard
//!
//! Everything here is synchronous and free of I/O.

pub mod budget;
pub mod domain;
pub mod error;
pub mod generator;
pub mod moments;
pub mod rng;
pub mod simulator;

pub use budget::{check_budget, check_daily, check_per_trade};
pub use error::{SimulationError, ValidationError};
pub use generator::{EdgeModel, TradeDraw};
pub use moments::RunningMoments;
pub use rng::{RngHierarchy, SequenceSource, UniformSource};
pub use simulator::{simulate_days, simulate_trades};
