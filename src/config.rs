//! Machine configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a [`MachineConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse machine config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid machine config: {0}")]
    Invalid(String),
}

/// Tunables of a [`CmdrAction`](crate::machine::CmdrAction).
///
/// Every field has a default, so a config file only needs the fields it
/// changes.
///
/// # Example
///
/// ```rust
/// use cmdr_action::config::MachineConfig;
///
/// let config = MachineConfig::from_json(r#"{ "max_checkpoint_depth": 4 }"#).unwrap();
/// assert_eq!(config.max_checkpoint_depth, 4);
/// assert!(config.record_history);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// How many simulation checkpoints may be nested
    pub max_checkpoint_depth: usize,
    /// Record fired transitions in the machine history
    pub record_history: bool,
    /// Keep at most this many history entries
    pub history_limit: Option<usize>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            max_checkpoint_depth: 16,
            record_history: true,
            history_limit: None,
        }
    }
}

impl MachineConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_checkpoint_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_checkpoint_depth must be at least 1".to_string(),
            ));
        }
        if self.history_limit == Some(0) {
            return Err(ConfigError::Invalid(
                "history_limit must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = MachineConfig::from_json("{}").unwrap();
        assert_eq!(config, MachineConfig::default());
    }

    #[test]
    fn zero_depth_is_rejected() {
        let result = MachineConfig::from_json(r#"{ "max_checkpoint_depth": 0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_history_limit_is_rejected() {
        let result = MachineConfig::from_json(r#"{ "history_limit": 0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let result = MachineConfig::from_json("{ max_checkpoint_depth: }");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
