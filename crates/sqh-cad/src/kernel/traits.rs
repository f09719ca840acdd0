//! CAD Kernel trait definitions
//!
//! These traits define the interface that all B-Rep kernels must implement.

use thiserror::Error;
use uuid::Uuid;

use crate::geometry::{BoundingBox, OrientedBox};
use crate::topology::Body;

/// Error type for CAD kernel operations
#[derive(Debug, Clone, Error)]
pub enum CadError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Boolean operation failed: {0}")]
    BooleanFailed(String),

    #[error("Kernel not available: {0}")]
    KernelNotAvailable(String),

    #[error("Solid not found: {0}")]
    SolidNotFound(Uuid),
}

/// Result type for CAD operations
pub type CadResult<T> = Result<T, CadError>;

/// Handle to a temporary solid owned by a kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Solid {
    /// Unique identifier
    pub id: Uuid,
}

impl Solid {
    /// Create a new solid handle with the given ID
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

/// The main B-Rep kernel trait
///
/// Implementations provide the actual modeling operations. Tool solids
/// returned by [`BrepKernel::create_box`] live inside the kernel until they
/// are released with [`BrepKernel::discard`].
pub trait BrepKernel: Send + Sync {
    /// Get the name of this kernel
    fn name(&self) -> &str;

    /// Check if the kernel is available
    fn is_available(&self) -> bool;

    /// Create a temporary box solid from an oriented box description
    fn create_box(&self, obb: &OrientedBox) -> CadResult<Solid>;

    /// Subtract a tool solid from a target body
    ///
    /// # Arguments
    /// * `target` - The body to cut
    /// * `tool` - The solid to remove from the target
    ///
    /// Returns the resulting body geometry. The tool is left untouched.
    fn subtract(&self, target: &Body, tool: &Solid) -> CadResult<Body>;

    /// Release a temporary solid
    fn discard(&self, solid: &Solid) -> CadResult<()>;

    /// Bounding box of a body
    fn bounding_box(&self, body: &Body) -> BoundingBox {
        body.bounds()
    }
}

/// A null kernel that always returns errors (used when no kernel is available)
#[derive(Debug, Default)]
pub struct NullKernel;

impl BrepKernel for NullKernel {
    fn name(&self) -> &str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn create_box(&self, _obb: &OrientedBox) -> CadResult<Solid> {
        Err(CadError::KernelNotAvailable(
            "No CAD kernel available".into(),
        ))
    }

    fn subtract(&self, _target: &Body, _tool: &Solid) -> CadResult<Body> {
        Err(CadError::KernelNotAvailable(
            "No CAD kernel available".into(),
        ))
    }

    fn discard(&self, _solid: &Solid) -> CadResult<()> {
        Err(CadError::KernelNotAvailable(
            "No CAD kernel available".into(),
        ))
    }
}

/// Get the default B-Rep kernel
pub fn default_kernel() -> Box<dyn BrepKernel> {
    Box::new(super::AnalyticKernel::new())
}
