//! Conversion errors

use sqh_cad::CadError;
use thiserror::Error;

/// Errors raised while converting round holes to square holes
#[derive(Debug, Clone, Error)]
pub enum HoleError {
    /// Invalid or degenerate input surface
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Subtraction failed or produced an invalid result
    #[error("Boolean operation failed: {0}")]
    BooleanOperation(String),

    /// Early termination requested by the host
    #[error("Cancellation requested")]
    CancellationRequested,

    /// The selection handed to the batch is unusable
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("CAD kernel error: {0}")]
    Kernel(#[from] CadError),
}

/// Result type for conversion operations
pub type HoleResult<T> = Result<T, HoleError>;

impl HoleError {
    /// Map a kernel error onto the conversion error kinds
    pub fn from_kernel(error: CadError) -> Self {
        match error {
            CadError::InvalidGeometry(msg) => HoleError::Geometry(msg),
            CadError::BooleanFailed(msg) => HoleError::BooleanOperation(msg),
            other => HoleError::Kernel(other),
        }
    }

    /// Returns true if this error only affects the face being converted
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            HoleError::Geometry(_) | HoleError::BooleanOperation(_)
        )
    }
}
