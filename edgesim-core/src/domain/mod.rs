//! Domain types for the trade-sequence simulator.

pub mod edge;
pub mod params;
pub mod run;
pub mod trade;

pub use edge::EdgeStats;
pub use params::{
    Cents, RiskLimit, RiskManagementProfile, RiskSizing, SimulationParams, SimulationRequest,
};
pub use run::{
    DailyRun, DailyRunSummary, DayMode, ModeDays, Recording, RunSummary, SimulatedDay,
    SimulatedRun, StreakSummary,
};
pub use trade::{SimulatedTrade, TradeOutcome};
