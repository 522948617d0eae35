//! Simulation config: tick rate, RNG seed, log level.
//!
//! Загружается из JSON (хост кладёт рядом с уровнем) или берётся Default.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logger::LogLevel;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("tick rate must be positive, got {0}")]
    InvalidTickRate(f32),
}

/// Параметры симуляции (ambient)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Частота FixedUpdate (Hz)
    pub tick_hz: f32,
    /// Seed детерминистичного RNG (spread, summon offsets)
    pub seed: u64,
    /// Минимальный уровень логов
    pub log_level: LogLevel,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_hz: 60.0,
            seed: 42,
            log_level: LogLevel::Info,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()
    }

    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(self) -> Result<Self, ConfigError> {
        if !(self.tick_hz.is_finite() && self.tick_hz > 0.0) {
            return Err(ConfigError::InvalidTickRate(self.tick_hz));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimulationConfig::from_json_str(r#"{ "seed": 7 }"#).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.tick_hz, 60.0);
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_rejects_non_positive_tick_rate() {
        let err = SimulationConfig::from_json_str(r#"{ "tick_hz": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTickRate(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = SimulationConfig::from_json_str("{ tick_hz: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
