//! Engine configuration.
//!
//! Limits for worlds and rates for the frame runner, loadable from TOML. Every section and
//! field has a default, so a file only needs to mention what it changes:
//!
//! ```toml
//! [world]
//! max_entities = 50000
//!
//! [runner]
//! target_frame_rate = 0.0   # unlimited
//! ```

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default maximum number of live entities per world.
pub const DEFAULT_MAX_ENTITIES: usize = 10_000;

/// Default number of distinct component types, which is also the capability mask width.
pub const DEFAULT_MAX_COMPONENT_TYPES: usize = 64;

/// Default number of distinct system types.
pub const DEFAULT_MAX_SYSTEM_TYPES: usize = 64;

/// Errors raised while loading or validating a [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub world: WorldConfig,
    pub runner: RunnerConfig,
}

/// Limits of a single world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Maximum number of live entities, pending ones included.
    pub max_entities: usize,
    /// Maximum number of distinct component types; the width of every capability mask.
    pub max_component_types: usize,
    /// Maximum number of distinct system types.
    pub max_system_types: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_entities: DEFAULT_MAX_ENTITIES,
            max_component_types: DEFAULT_MAX_COMPONENT_TYPES,
            max_system_types: DEFAULT_MAX_SYSTEM_TYPES,
        }
    }
}

/// Rates of the frame runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Frames per second to pace the loop to. Zero runs unpaced.
    pub target_frame_rate: f32,
    /// Fixed updates per second.
    pub fixed_update_rate: f32,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            target_frame_rate: 60.0,
            fixed_update_rate: 60.0,
        }
    }
}

impl Config {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check the values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.validate()?;
        self.runner.validate()
    }
}

impl WorldConfig {
    /// Reject zero capacities and entity counts that do not fit an id.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("max_entities", self.max_entities),
            ("max_component_types", self.max_component_types),
            ("max_system_types", self.max_system_types),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("world.{field} must be positive")));
            }
        }
        if self.max_entities > u32::MAX as usize {
            return Err(ConfigError::Invalid(format!(
                "world.max_entities must not exceed {}",
                u32::MAX
            )));
        }
        Ok(())
    }
}

impl RunnerConfig {
    /// Reject rates the frame clock cannot turn into a duration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_fixed_rate(self.fixed_update_rate)?;
        validate_target_rate(self.target_frame_rate)
    }
}

/// Rates below this would need a step longer than a `Duration` can hold.
const MIN_RATE: f32 = f32::EPSILON;

pub(crate) fn validate_fixed_rate(rate: f32) -> Result<(), ConfigError> {
    if rate.is_finite() && rate >= MIN_RATE {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "runner.fixed_update_rate must be a positive number, got {rate}"
        )))
    }
}

pub(crate) fn validate_target_rate(rate: f32) -> Result<(), ConfigError> {
    if rate == 0.0 || (rate.is_finite() && rate >= MIN_RATE) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "runner.target_frame_rate must be zero or a positive number, got {rate}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_text_gives_defaults() {
        // When
        let config = Config::from_toml_str("").unwrap();

        // Then
        assert_eq!(config, Config::default());
        assert_eq!(config.world.max_entities, 10_000);
        assert_eq!(config.world.max_component_types, 64);
        assert_eq!(config.runner.fixed_update_rate, 60.0);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        // Given
        let text = r#"
            [world]
            max_entities = 128

            [runner]
            target_frame_rate = 0.0
        "#;

        // When
        let config = Config::from_toml_str(text).unwrap();

        // Then
        assert_eq!(config.world.max_entities, 128);
        assert_eq!(config.world.max_system_types, 64);
        assert_eq!(config.runner.target_frame_rate, 0.0);
        assert_eq!(config.runner.fixed_update_rate, 60.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        // Given
        let zero_masks = "[world]\nmax_component_types = 0";
        let zero_rate = "[runner]\nfixed_update_rate = 0.0";

        // Then
        assert!(matches!(
            Config::from_toml_str(zero_masks),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml_str(zero_rate),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[world]\nmax_entities = \"lots\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn zero_system_types_are_rejected() {
        // When
        let result = Config::from_toml_str("[world]\nmax_system_types = 0");

        // Then
        match result {
            Err(ConfigError::Invalid(message)) => assert!(message.contains("max_system_types")),
            other => panic!("expected an invalid config, got {other:?}"),
        }
    }

    #[test]
    fn runner_rates_are_checked_without_toml() {
        // Given
        let zero = RunnerConfig {
            target_frame_rate: 0.0,
            fixed_update_rate: 0.0,
        };
        let nan = RunnerConfig {
            fixed_update_rate: f32::NAN,
            ..RunnerConfig::default()
        };
        let negative_target = RunnerConfig {
            target_frame_rate: -1.0,
            ..RunnerConfig::default()
        };

        // Then
        assert!(matches!(zero.validate(), Err(ConfigError::Invalid(_))));
        assert!(matches!(nan.validate(), Err(ConfigError::Invalid(_))));
        assert!(matches!(negative_target.validate(), Err(ConfigError::Invalid(_))));
        assert!(RunnerConfig::default().validate().is_ok());
    }

    #[test]
    fn load_reads_a_file() {
        // Given
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[world]\nmax_system_types = 8").unwrap();

        // When
        let config = Config::load(file.path()).unwrap();

        // Then
        assert_eq!(config.world.max_system_types, 8);
    }

    #[test]
    fn load_reports_missing_files() {
        // When
        let result = Config::load("/definitely/not/here/ember.toml");

        // Then
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
