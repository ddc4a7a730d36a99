// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Bonding Chart Engine - Engine Configuration

//! Engine-wide parameters and the recoverable error type.
//!
//! Everything here is plain data with serde support so callers can load it
//! from JSON (the bench harness does) or hand it across the wasm boundary.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Invalid-argument failures. The engine itself never fails once a valid
/// configuration and options are in hand.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown chart type: {0:?} (expected full, pre or post)")]
    UnknownChartType(String),
    #[error("unknown scenario: {0:?}")]
    UnknownScenario(String),
    #[error("unknown volatility level: {0:?} (expected low, medium, high or extreme)")]
    UnknownVolatility(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Inclusive candle-count range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

impl CountRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Opening cap of every pre-bonding segment and its hard floor.
    pub initial_cap: f64,
    /// Bonding threshold. Post-bonding closes never exceed it.
    pub bonding_cap: f64,
    pub pre_bonding_candles: CountRange,
    pub post_bonding_candles: CountRange,
    /// Spacing between candle timestamps.
    pub candle_interval_secs: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_cap: 5_000.0,
            bonding_cap: 100_000.0,
            pre_bonding_candles: CountRange::new(150, 400),
            post_bonding_candles: CountRange::new(500, 1500),
            candle_interval_secs: 60,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_cap.is_finite() && self.initial_cap > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "initial cap must be positive, got {}",
                self.initial_cap
            )));
        }
        if !(self.bonding_cap.is_finite() && self.bonding_cap > self.initial_cap) {
            return Err(ConfigError::Invalid(format!(
                "bonding cap {} must exceed initial cap {}",
                self.bonding_cap, self.initial_cap
            )));
        }
        // Progress is i / (n - 1), so the pre-bonding stage needs two candles.
        check_range("pre-bonding", self.pre_bonding_candles, 2)?;
        check_range("post-bonding", self.post_bonding_candles, 1)?;
        if self.candle_interval_secs == 0 {
            return Err(ConfigError::Invalid("candle interval must be non-zero".into()));
        }
        Ok(())
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

fn check_range(label: &str, range: CountRange, floor: u32) -> Result<(), ConfigError> {
    if range.min < floor || range.min > range.max {
        return Err(ConfigError::Invalid(format!(
            "{label} candle range [{}, {}] is empty or below {floor}",
            range.min, range.max
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn bonding_cap_must_exceed_initial() {
        let config = EngineConfig { bonding_cap: 4_000.0, ..EngineConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn inverted_range_rejected() {
        let config = EngineConfig {
            post_bonding_candles: CountRange::new(900, 100),
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn single_candle_pre_bonding_rejected() {
        let config = EngineConfig {
            pre_bonding_candles: CountRange::new(1, 1),
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = EngineConfig::from_json(r#"{"bondingCap": 69000.0}"#).unwrap();
        assert_eq!(config.bonding_cap, 69_000.0);
        assert_eq!(config.initial_cap, 5_000.0);
        assert_eq!(config.candle_interval_secs, 60);
    }

    #[test]
    fn malformed_json_is_invalid() {
        assert!(matches!(
            EngineConfig::from_json("{ not json"),
            Err(ConfigError::Invalid(_))
        ));
    }
}
