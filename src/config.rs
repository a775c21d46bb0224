// Timeouts, topics, robot configuration
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gait::LegGeometry;
use crate::legs::LegTable;
use crate::neural::IntegratorModel;

// Runtime loop frequency
pub const LOOP_HZ: u64 = 50;

// Command timeout for watchdog
pub const CMD_TIMEOUT: Duration = Duration::from_millis(250);

// Zenoh topics
pub const TOPIC_CMD_GAIT: &str = "hexapod/cmd/gait"; // commands
pub const TOPIC_RT_JOINTS: &str = "hexapod/rt/joints"; // joint angles
pub const TOPIC_HEALTH: &str = "hexapod/state/health"; // health status
pub const TOPIC_TELEMETRY: &str = "hexapod/state/telemetry"; // neural/kinematic snapshot

// Publish telemetry every N ticks
pub const TELEMETRY_EVERY: u64 = 10;

// Integration step handed to the core each tick (model time units)
pub const DEFAULT_DT: f32 = 1.0;

// Neural ticks run before the loop starts publishing
pub const DEFAULT_WARMUP_STEPS: usize = 1000;

// Warm-up runs a gentle forward command with a fine step
pub const WARMUP_DT: f32 = 0.01;
pub const WARMUP_GO: f32 = 1.0;

/// Error types for robot configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Link {link} must be a positive finite length, got {value}")]
    InvalidLinkLength { link: &'static str, value: f32 },

    #[error("Mount point of leg {leg} is not finite")]
    NonFiniteMount { leg: usize },

    #[error("Output sign of leg {leg} must be +1 or -1")]
    InvalidSign { leg: usize },
}

/// Constants of the neural leg drive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuralConfig {
    /// Stance length target T
    pub stance_target: f32,
    /// Horizontal oscillator gain D
    pub drive_gain: f32,
    /// Vertical oscillator gain
    pub lift_gain: f32,
    pub model: IntegratorModel,
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            stance_target: 100.0,
            drive_gain: 2.0,
            lift_gain: 3.0,
            model: IntegratorModel::Full,
        }
    }
}

/// Full robot description, optionally loaded from JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub geometry: LegGeometry,
    pub legs: LegTable,
    pub neural: NeuralConfig,
}

impl RobotConfig {
    /// Read and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject geometry the closed-form solver cannot use
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.geometry;
        for (link, value) in [("femur", g.femur), ("tibia", g.tibia)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidLinkLength { link, value });
            }
        }
        if !g.coxa.is_finite() {
            return Err(ConfigError::InvalidLinkLength {
                link: "coxa",
                value: g.coxa,
            });
        }
        if let Some(leg) = g.mounts.iter().position(|m| !m.is_finite()) {
            return Err(ConfigError::NonFiniteMount { leg });
        }
        if let Some(leg) = self
            .legs
            .legs
            .iter()
            .position(|l| l.output_sign != 1.0 && l.output_sign != -1.0)
        {
            return Err(ConfigError::InvalidSign { leg });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        RobotConfig::default().validate().unwrap();
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = RobotConfig::from_json("{}").unwrap();
        assert_eq!(config, RobotConfig::default());
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = RobotConfig::from_json(
            r#"{ "geometry": { "femur": 80.0 }, "neural": { "model": "lite" } }"#,
        )
        .unwrap();
        assert_eq!(config.geometry.femur, 80.0);
        assert_eq!(config.geometry.tibia, 140.85);
        assert_eq!(config.neural.model, IntegratorModel::Lite);
        assert_eq!(config.neural.stance_target, 100.0);
    }

    #[test]
    fn test_rejects_zero_link() {
        let err = RobotConfig::from_json(r#"{ "geometry": { "tibia": 0.0 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidLinkLength { link: "tibia", .. }
        ));
    }

    #[test]
    fn test_rejects_bad_sign() {
        let mut config = RobotConfig::default();
        config.legs.legs[4].output_sign = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSign { leg: 4 })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            RobotConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
