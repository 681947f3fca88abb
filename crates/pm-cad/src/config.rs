//! Modeler Configuration
//!
//! Numeric tolerances and defaults shared by the resolution passes,
//! persisted as RON.

use std::path::Path;

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Default epsilon below which a distance is treated as zero
pub const DEFAULT_DISTANCE_EPSILON: f64 = 1e-9;

/// Default tolerance for `==` / `!=` in rule conditions
pub const DEFAULT_CONDITION_TOLERANCE: f64 = 1e-12;

/// Tolerances and defaults for sketches, rules and mates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelerConfig {
    /// Distances at or below this are considered degenerate
    pub distance_epsilon: f64,
    /// Tolerance used by equality comparisons in rule conditions
    pub condition_tolerance: f64,
    /// Axis used by axial mates
    pub mate_axis: DVec3,
}

impl Default for ModelerConfig {
    fn default() -> Self {
        Self {
            distance_epsilon: DEFAULT_DISTANCE_EPSILON,
            condition_tolerance: DEFAULT_CONDITION_TOLERANCE,
            mate_axis: DVec3::X,
        }
    }
}

impl ModelerConfig {
    /// Parse a configuration from RON text; missing fields keep their defaults
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: ModelerConfig =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        tracing::debug!("Loading modeler config from {}", path.display());
        Self::from_ron_str(&content)
    }

    /// Serialize to pretty RON
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Save the configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = self.to_ron_string()?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Check that tolerances are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.distance_epsilon.is_nan() || self.distance_epsilon < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "distance_epsilon",
                value: self.distance_epsilon,
            });
        }
        if self.condition_tolerance.is_nan() || self.condition_tolerance < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "condition_tolerance",
                value: self.condition_tolerance,
            });
        }
        if self.mate_axis.length_squared() <= f64::EPSILON || !self.mate_axis.is_finite() {
            return Err(ConfigError::DegenerateAxis);
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },
    #[error("Mate axis must be a non-zero finite vector")]
    DegenerateAxis,
}
