//! Tunable thresholds and cost constants for planning and movement.
//! Values load from TOML; every field has a default so partial files are accepted.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Scale factor in `1 / (value + 1) * cost_scale`.
    pub cost_scale: f32,
    /// Multiplier for entering a recovery-item cell under the recovery-aware model.
    pub recovery_discount: f32,
    /// Health strictly below this routes toward threats with the recovery discount.
    pub wounded_threshold: f32,
    pub max_health: f32,
    pub heuristic_weight: f32,
    pub poison_damage: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cost_scale: 0.1,
            recovery_discount: 0.5,
            wounded_threshold: 70.0,
            max_health: 100.0,
            heuristic_weight: 1.0,
            poison_damage: 5.0,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("cost_scale", self.cost_scale)?;
        positive("heuristic_weight", self.heuristic_weight)?;
        positive("max_health", self.max_health)?;
        if !(self.recovery_discount > 0.0 && self.recovery_discount <= 1.0) {
            return Err(ConfigError::Invalid {
                field: "recovery_discount",
                reason: format!("{} is outside (0, 1]", self.recovery_discount),
            });
        }
        if !(0.0..=self.max_health).contains(&self.wounded_threshold) {
            return Err(ConfigError::Invalid {
                field: "wounded_threshold",
                reason: format!("{} is outside [0, {}]", self.wounded_threshold, self.max_health),
            });
        }
        if !(self.poison_damage.is_finite() && self.poison_damage >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "poison_damage",
                reason: format!("{} must be finite and non-negative", self.poison_damage),
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid { field, reason: format!("{value} must be finite and positive") })
    }
}
