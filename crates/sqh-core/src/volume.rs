//! Cutting Volume Builder
//!
//! Computes the oriented rectangular prism that replaces a round hole: it is
//! centered on the cylinder origin, runs along the cylinder axis, and its
//! cross section is the tight 2r x 2r square around the hole.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use sqh_cad::{Axis3D, Body, BoundingBox, Face, OrientedBox};

use crate::classify::hole_surface;
use crate::config::CutLength;
use crate::error::{HoleError, HoleResult};

/// Oriented rectangular prism removed from a body to square a hole
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CuttingVolume {
    /// Center of the prism (the cylinder origin)
    pub origin: Vec3,
    /// Unit axis of the prism length (the cylinder axis)
    pub primary_axis: Vec3,
    /// Unit axis of the prism width, perpendicular to the primary axis
    pub lateral_axis: Vec3,
    /// Unit axis of the prism height
    pub secondary_axis: Vec3,
    /// Extent along the primary axis
    pub length: f32,
    /// Extent along the lateral axis
    pub width: f32,
    /// Extent along the secondary axis
    pub height: f32,
}

impl CuttingVolume {
    /// Oriented box description handed to the kernel
    pub fn to_oriented_box(&self) -> OrientedBox {
        OrientedBox::new(
            self.origin,
            self.primary_axis,
            self.lateral_axis,
            self.length,
            self.width,
            self.height,
        )
    }

    /// Area of the square cross section
    pub fn cross_section_area(&self) -> f32 {
        self.width * self.height
    }
}

/// Builds cutting volumes from hole faces
#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeBuilder {
    cut_length: CutLength,
}

impl VolumeBuilder {
    /// Create a builder with the given length policy
    pub fn new(cut_length: CutLength) -> Self {
        Self { cut_length }
    }

    /// Build the cutting volume for a hole face of `body`
    pub fn build(&self, face: &Face, body: &Body) -> HoleResult<CuttingVolume> {
        self.build_within(face, &body.bounds())
    }

    /// Build the cutting volume for a hole face of a body with `bounds`
    ///
    /// Lets the caller take the body extent from its kernel.
    pub fn build_within(&self, face: &Face, bounds: &BoundingBox) -> HoleResult<CuttingVolume> {
        let cylinder = hole_surface(face)?;
        let axis = Axis3D::new(cylinder.origin, cylinder.axis);
        let lateral = axis.perpendicular();
        let secondary = cylinder.axis.cross(lateral);

        let length = self.length_through(face, bounds, &axis)?;
        let side = cylinder.radius * 2.0;

        Ok(CuttingVolume {
            origin: cylinder.origin,
            primary_axis: cylinder.axis,
            lateral_axis: lateral,
            secondary_axis: secondary,
            length,
            width: side,
            height: side,
        })
    }

    /// Length of a prism centered on the axis origin that traverses the body
    fn length_through(&self, face: &Face, bounds: &BoundingBox, axis: &Axis3D) -> HoleResult<f32> {
        if !bounds.is_valid() {
            return Err(HoleError::Geometry(format!(
                "Body of {} has invalid bounds",
                face.id
            )));
        }

        let (lo, hi) = bounds.extent_along(axis.origin, axis.direction);
        // Centered prism: twice the farthest reach from the origin
        let required = 2.0 * lo.abs().max(hi.abs());

        match self.cut_length {
            CutLength::Fixed(length) => {
                if length > required {
                    Ok(length)
                } else {
                    let extended = required * 1.01 + 1.0;
                    tracing::warn!(
                        "Cut length {} does not traverse the body of {} (needs {}), using {}",
                        length,
                        face.id,
                        required,
                        extended
                    );
                    Ok(extended)
                }
            }
            CutLength::FitToBody { margin } => Ok(required + 2.0 * margin.max(0.0)),
        }
    }
}
