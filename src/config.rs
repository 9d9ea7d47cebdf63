//! Configuration for the playback engine
//!
//! Engine configuration covers the knobs shared by every session: the
//! default and maximum speed multiplier, the layer-parameter update
//! cadence, per-parameter history depth, and the optional PRNG seed used
//! by the parameter simulator.
//!
//! Configuration can be built in code or loaded from a TOML file:
//!
//! ```toml
//! default_speed = 1.0
//! max_speed = 20.0
//! parameter_cadence_ms = 15000
//! history_depth = 100
//! seed = 42
//! ```

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default playback speed multiplier
pub const DEFAULT_SPEED: f64 = 1.0;

/// Maximum playback speed multiplier (matches the 0.5x-20x control range)
pub const DEFAULT_MAX_SPEED: f64 = 20.0;

/// Default layer-parameter update cadence in milliseconds
pub const DEFAULT_PARAMETER_CADENCE_MS: u64 = 15_000;

/// Default per-parameter history ring depth
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// Engine-wide configuration shared by all sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Speed multiplier applied to new sessions
    pub default_speed: f64,
    /// Upper bound for `set_speed`; requested values are clamped here
    pub max_speed: f64,
    /// Base cadence of layer-parameter updates, in virtual milliseconds.
    /// The effective wall-clock interval is `cadence / speed_multiplier`.
    pub parameter_cadence_ms: u64,
    /// Number of history entries retained per simulated parameter
    pub history_depth: usize,
    /// Seed for the parameter simulator PRNG. Set it for reproducible
    /// runs; each session mixes its id into the seed so concurrent
    /// sessions still walk independently. When absent, every session
    /// draws a fresh random seed.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_speed: DEFAULT_SPEED,
            max_speed: DEFAULT_MAX_SPEED,
            parameter_cadence_ms: DEFAULT_PARAMETER_CADENCE_MS,
            history_depth: DEFAULT_HISTORY_DEPTH,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: EngineConfig = toml::from_str(&contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), contents)?;
        Ok(())
    }

    /// Validate configuration invariants
    pub fn validate(&self) -> Result<()> {
        if self.default_speed <= 0.0 {
            return Err(EngineError::Config(format!(
                "default_speed must be positive, got {}",
                self.default_speed
            )));
        }
        if self.max_speed < self.default_speed {
            return Err(EngineError::Config(format!(
                "max_speed ({}) must be >= default_speed ({})",
                self.max_speed, self.default_speed
            )));
        }
        if self.parameter_cadence_ms == 0 {
            return Err(EngineError::Config(
                "parameter_cadence_ms must be non-zero".to_string(),
            ));
        }
        if self.history_depth == 0 {
            return Err(EngineError::Config(
                "history_depth must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_speed, 1.0);
        assert_eq!(config.parameter_cadence_ms, 15_000);
    }

    #[test]
    fn test_invalid_speed_rejected() {
        let config = EngineConfig {
            default_speed: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = EngineConfig {
            default_speed: 2.0,
            parameter_cadence_ms: 1_000,
            seed: Some(42),
            ..Default::default()
        };
        let text = toml::to_string(&config).unwrap();
        let parsed: EngineConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.default_speed, 2.0);
        assert_eq!(parsed.parameter_cadence_ms, 1_000);
        assert_eq!(parsed.seed, Some(42));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: EngineConfig = toml::from_str("default_speed = 4.0").unwrap();
        assert_eq!(parsed.default_speed, 4.0);
        assert_eq!(parsed.max_speed, DEFAULT_MAX_SPEED);
        assert_eq!(parsed.history_depth, DEFAULT_HISTORY_DEPTH);
    }
}
