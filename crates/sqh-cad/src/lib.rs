//! B-Rep Kernel Abstraction
//!
//! This crate provides:
//! - Geometry value types (axes, axis-aligned and oriented boxes)
//! - Boundary representation of solid bodies (bodies, faces, surfaces)
//! - An abstract kernel trait for box construction and boolean subtraction
//! - An analytic reference kernel and body primitives

pub mod geometry;
pub mod kernel;
pub mod primitive;
pub mod topology;

// Re-exports for convenience
pub use geometry::{Axis3D, BoundingBox, LINEAR_TOLERANCE, OrientedBox};
pub use kernel::{AnalyticKernel, BrepKernel, CadError, CadResult, NullKernel, Solid, default_kernel};
pub use primitive::{add_boss, block, drill_hole};
pub use topology::{Body, CylindricalSurface, Face, FaceId, Surface, SurfaceKind};
