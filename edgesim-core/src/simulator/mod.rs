//! Single-run simulators.
//!
//! Both simulators fold drawn trades through [`EquityAccumulator`] and return
//! a terminal summary, plus the full sequence when asked to record it.

pub mod accumulator;
pub mod daily;
pub mod per_trade;

pub use accumulator::{EquityAccumulator, StreakTracker};
pub use daily::simulate_days;
pub use per_trade::simulate_trades;
