//! Conversion configuration
//!
//! Settings can be serialized and loaded from RON configuration files.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default oversized cut length (model units)
pub const DEFAULT_CUT_LENGTH: f32 = 100000.0;

/// How long the cutting volume is along the hole axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CutLength {
    /// Fixed oversized length, extended to the body's extent when too short
    Fixed(f32),
    /// Exact extent of the body along the hole axis plus a margin on each side
    FitToBody { margin: f32 },
}

impl Default for CutLength {
    fn default() -> Self {
        CutLength::Fixed(DEFAULT_CUT_LENGTH)
    }
}

/// Batch conversion configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConversionConfig {
    /// Length policy for cutting volumes
    pub cut_length: CutLength,
    /// Whether cancellation is also checked before each face-level cut
    pub check_cancel_per_face: bool,
    /// Upper bound on cut attempts per body
    pub max_cuts_per_body: usize,
    /// Process independent bodies on a thread pool (requires `parallel`)
    pub parallel: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            cut_length: CutLength::default(),
            check_cancel_per_face: true,
            max_cuts_per_body: 10_000,
            parallel: false,
        }
    }
}

impl ConversionConfig {
    /// Check that the settings are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.cut_length {
            CutLength::Fixed(length) if !(length.is_finite() && length > 0.0) => {
                return Err(ConfigError::Invalid(format!(
                    "cut length must be positive, got {length}"
                )));
            }
            CutLength::FitToBody { margin } if !(margin.is_finite() && margin >= 0.0) => {
                return Err(ConfigError::Invalid(format!(
                    "fit margin must be non-negative, got {margin}"
                )));
            }
            _ => {}
        }
        if self.max_cuts_per_body == 0 {
            return Err(ConfigError::Invalid(
                "max_cuts_per_body must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron(&content)
    }

    /// Parse configuration from a RON string
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: ConversionConfig =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
