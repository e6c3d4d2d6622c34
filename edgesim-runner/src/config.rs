//! Serializable simulation configuration (TOML).
//!
//! ```toml
//! [simulation]
//! mode = "daily"
//! initial_balance = 1000000
//! risk = { type = "percent_of_balance", percent = 1.0 }
//! win_rate = 45.0
//! reward_risk_ratio = 2.0
//! trading_days_per_week = 5
//! trading_days_per_month = 21
//! months_to_trade = 12
//! max_trades_per_day = 3
//! max_loss_per_week = { kind = "r", value = 4.0 }
//! simulation_count = 2000
//!
//! [ensemble]
//! seed = 7
//! threads = 4
//!
//! [output]
//! bucket_count = 25
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use edgesim_core::domain::SimulationRequest;
use edgesim_core::ValidationError;

use crate::buckets::DEFAULT_BUCKET_COUNT;
use crate::ensemble::{EnsembleOptions, DEFAULT_MASTER_SEED};

/// Errors from loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(String),
    #[error("invalid config: {0}")]
    Invalid(#[from] ValidationError),
}

/// Ensemble execution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleSection {
    pub seed: u64,
    pub threads: usize,
}

impl Default for EnsembleSection {
    fn default() -> Self {
        Self {
            seed: DEFAULT_MASTER_SEED,
            threads: 1,
        }
    }
}

/// Output shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub bucket_count: usize,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
        }
    }
}

/// A complete, reproducible simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub simulation: SimulationRequest,
    #[serde(default)]
    pub ensemble: EnsembleSection,
    #[serde(default)]
    pub output: OutputSection,
}

impl SimulationConfig {
    pub fn new(simulation: SimulationRequest) -> Self {
        Self {
            simulation,
            ensemble: EnsembleSection::default(),
            output: OutputSection::default(),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config = Self::parse_toml(content)?;
        config.simulation.validate()?;
        Ok(config)
    }

    /// Parse a TOML document without range or budget checks.
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    pub fn options(&self) -> EnsembleOptions {
        EnsembleOptions {
            master_seed: self.ensemble.seed,
            threads: self.ensemble.threads,
            bucket_count: self.output.bucket_count,
        }
    }

    /// Deterministic BLAKE3 hash of this configuration.
    ///
    /// Two runs with identical configs have the same hash.
    pub fn config_hash(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgesim_core::domain::{RiskLimit, RiskManagementProfile, RiskSizing, SimulationParams};

    const DAILY: &str = r#"
[simulation]
mode = "daily"
initial_balance = 1000000
risk = { type = "fixed_amount", cents = 10000 }
win_rate = 45.0
reward_risk_ratio = 2.0
breakeven_rate = 0.1
commission_per_trade = 250
trading_days_per_week = 5
trading_days_per_month = 21
months_to_trade = 12
max_trades_per_day = 3
max_loss_per_day = { kind = "currency", cents = 20000 }
max_loss_per_week = { kind = "r", value = 4.0 }
simulation_count = 500

[ensemble]
seed = 7
threads = 4

[output]
bucket_count = 25
"#;

    #[test]
    fn parses_daily_config() {
        let config = SimulationConfig::from_toml(DAILY).unwrap();
        let SimulationRequest::Daily(profile) = &config.simulation else {
            panic!("expected daily request");
        };
        assert_eq!(profile.risk, RiskSizing::FixedAmount { cents: 10_000 });
        assert_eq!(profile.max_loss_per_day, Some(RiskLimit::Currency { cents: 20_000 }));
        assert_eq!(profile.max_loss_per_week, Some(RiskLimit::R { value: 4.0 }));
        assert_eq!(profile.max_loss_per_month, None);
        assert_eq!(profile.loss_recovery_risk_multiplier, 1.0);
        let options = config.options();
        assert_eq!(options.master_seed, 7);
        assert_eq!(options.threads, 4);
        assert_eq!(options.bucket_count, 25);
    }

    #[test]
    fn sections_default_when_missing() {
        let toml = r#"
[simulation]
mode = "per_trade"
initial_balance = 500000
risk = { type = "percent_of_balance", percent = 2.0 }
win_rate = 50
reward_risk_ratio = 1.5
number_of_trades = 100
simulation_count = 100
"#;
        let config = SimulationConfig::from_toml(toml).unwrap();
        assert_eq!(config.ensemble, EnsembleSection::default());
        assert_eq!(config.output.bucket_count, DEFAULT_BUCKET_COUNT);
        let SimulationRequest::PerTrade(params) = &config.simulation else {
            panic!("expected per-trade request");
        };
        assert_eq!(params.win_rate, 50.0);
        assert_eq!(params.commission_percent, 0.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let toml = DAILY.replace("win_rate = 45.0", "win_rate = 145.0");
        assert!(matches!(
            SimulationConfig::from_toml(&toml),
            Err(ConfigError::Invalid(ValidationError::WinRateOutOfRange(_)))
        ));
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        let toml = DAILY.replace("mode = \"daily\"", "mode = \"weekly\"");
        assert!(matches!(SimulationConfig::from_toml(&toml), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn toml_round_trip() {
        let config = SimulationConfig::new(SimulationRequest::Daily(RiskManagementProfile {
            max_loss_per_month: Some(RiskLimit::R { value: 8.0 }),
            ..RiskManagementProfile::default()
        }));
        let text = config.to_toml().unwrap();
        assert_eq!(SimulationConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn config_hash_is_stable_and_sensitive() {
        let a = SimulationConfig::new(SimulationRequest::PerTrade(SimulationParams::default()));
        let mut b = a.clone();
        assert_eq!(a.config_hash().unwrap(), b.config_hash().unwrap());
        b.ensemble.seed = 43;
        assert_ne!(a.config_hash().unwrap(), b.config_hash().unwrap());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SimulationConfig::from_file(Path::new("/nonexistent/edgesim.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
