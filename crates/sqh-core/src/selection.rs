//! Selection file serialization

use std::path::Path;

use serde::{Deserialize, Serialize};
use sqh_cad::Body;

/// Current selection file format version
pub const SELECTION_VERSION: u32 = 1;

/// Ordered set of bodies handed to a batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    /// File format version
    pub version: u32,
    /// Selected bodies, in processing order
    pub bodies: Vec<Body>,
}

impl Default for Selection {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Selection {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self {
            version: SELECTION_VERSION,
            bodies,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Save selection to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SelectionError> {
        let content = self.to_bytes()?;
        std::fs::write(path.as_ref(), content).map_err(|e| SelectionError::Io(e.to_string()))?;
        Ok(())
    }

    /// Serialize selection to RON bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, SelectionError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| SelectionError::Serialize(e.to_string()))?;
        Ok(content.into_bytes())
    }

    /// Load selection from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SelectionError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SelectionError::Io(e.to_string()))?;
        Self::from_bytes(content.as_bytes())
    }

    /// Load selection from RON bytes
    pub fn from_bytes(data: &[u8]) -> Result<Self, SelectionError> {
        let content =
            std::str::from_utf8(data).map_err(|e| SelectionError::Deserialize(e.to_string()))?;
        let selection: Selection =
            ron::from_str(content).map_err(|e| SelectionError::Deserialize(e.to_string()))?;
        if selection.version > SELECTION_VERSION {
            return Err(SelectionError::UnsupportedVersion(selection.version));
        }
        Ok(selection)
    }
}

/// Selection-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum SelectionError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Unsupported selection version: {0}")]
    UnsupportedVersion(u32),
}
