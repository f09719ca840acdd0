//! Analytic Reference Kernel
//!
//! A small kernel that works directly on analytic face descriptions.
//!
//! Note: subtraction only supports through-cuts, i.e. a box tool whose length
//! axis traverses the target. Faces fully inside the tool are removed, planar
//! faces pierced by the tool axis lose the tool footprint, and the four walls
//! of the rectangular opening are added. Anything more general needs a full
//! boolean engine behind [`BrepKernel`].

use std::collections::HashMap;
use std::f32::consts::TAU;

use glam::Vec3;
use parking_lot::Mutex;
use uuid::Uuid;

use super::{BrepKernel, CadError, CadResult, Solid};
use crate::geometry::{BoundingBox, LINEAR_TOLERANCE, OrientedBox, perpendicular_to};
use crate::topology::{Body, Face, Surface};

/// Samples around each ring of a cylindrical face
const RING_SAMPLES: usize = 16;
/// Rings sampled along the axis of a cylindrical face
const AXIAL_SAMPLES: usize = 5;

/// Analytic B-Rep kernel
pub struct AnalyticKernel {
    /// Storage for temporary tool solids (keyed by UUID)
    solids: Mutex<HashMap<Uuid, OrientedBox>>,
    /// Linear tolerance for containment tests
    tolerance: f32,
}

impl AnalyticKernel {
    /// Create a new analytic kernel with the default tolerance
    pub fn new() -> Self {
        Self::with_tolerance(LINEAR_TOLERANCE)
    }

    /// Create a new analytic kernel with a custom linear tolerance
    pub fn with_tolerance(tolerance: f32) -> Self {
        Self {
            solids: Mutex::new(HashMap::new()),
            tolerance,
        }
    }

    /// Number of temporary solids currently held by the kernel
    pub fn stored_solid_count(&self) -> usize {
        self.solids.lock().len()
    }

    /// Store a solid and return a Solid reference
    fn store_solid(&self, obb: OrientedBox) -> Solid {
        let id = Uuid::new_v4();
        self.solids.lock().insert(id, obb);
        Solid::new(id)
    }

    /// Get a stored solid by ID
    fn get_solid(&self, id: Uuid) -> Option<OrientedBox> {
        self.solids.lock().get(&id).copied()
    }

    /// Returns true if the face lies entirely inside the tool
    fn is_swallowed(&self, face: &Face, tool: &OrientedBox) -> bool {
        let samples = sample_points(face);
        !samples.is_empty()
            && samples
                .iter()
                .all(|p| tool.contains_point(*p, self.tolerance))
    }

    /// Remove the tool footprint from a planar face pierced by the tool axis
    fn trim_pierced(&self, face: &mut Face, tool: &OrientedBox, span: (f32, f32), opening: f32) {
        let Surface::Plane { origin, normal } = face.surface else {
            return;
        };

        let denom = normal.dot(tool.length_direction);
        if denom.abs() < 1e-6 {
            return;
        }

        let t = (origin - tool.center).dot(normal) / denom;
        if t < span.0 - self.tolerance || t > span.1 + self.tolerance {
            return;
        }

        let hit = tool.center + tool.length_direction * t;
        if !face.bounds.contains_point_within(hit, self.tolerance) {
            return;
        }

        let footprint = (tool.width * tool.height - opening).max(0.0) / denom.abs();
        face.area = (face.area - footprint).max(0.0);
    }
}

impl Default for AnalyticKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl BrepKernel for AnalyticKernel {
    fn name(&self) -> &str {
        "analytic"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn create_box(&self, obb: &OrientedBox) -> CadResult<Solid> {
        if !obb.is_valid() {
            return Err(CadError::InvalidGeometry(format!(
                "Box extents must be positive and finite (length {}, width {}, height {})",
                obb.length, obb.width, obb.height
            )));
        }
        Ok(self.store_solid(*obb))
    }

    fn subtract(&self, target: &Body, tool: &Solid) -> CadResult<Body> {
        let obb = self
            .get_solid(tool.id)
            .ok_or(CadError::SolidNotFound(tool.id))?;
        let bounds = target.bounds();

        if target.faces().is_empty() || !bounds.is_valid() {
            return Err(CadError::BooleanFailed(format!(
                "Target '{}' has no volume",
                target.name
            )));
        }

        if !obb.intersects_aabb(&bounds, self.tolerance) {
            return Err(CadError::BooleanFailed(format!(
                "Tool does not intersect target '{}'",
                target.name
            )));
        }

        if bounds
            .corners()
            .iter()
            .all(|c| obb.contains_point(*c, self.tolerance))
        {
            return Err(CadError::BooleanFailed(format!(
                "Subtraction would consume all of '{}'",
                target.name
            )));
        }

        let half_length = obb.length * 0.5;
        let span = bounds
            .clip_line(obb.center, obb.length_direction)
            .map(|(t0, t1)| (t0.max(-half_length), t1.min(half_length)))
            .filter(|(t0, t1)| t1 - t0 > self.tolerance)
            .ok_or_else(|| {
                CadError::BooleanFailed(format!(
                    "Tool axis does not traverse target '{}'",
                    target.name
                ))
            })?;

        let mut result = target.clone();

        // Circular openings already present along the cut axis
        let mut opening = 0.0;
        let mut removed = 0usize;
        result.retain_faces(|face| {
            if !self.is_swallowed(face, &obb) {
                return true;
            }
            if let Some(cylinder) = face.surface.as_cylinder()
                && cylinder.axis.dot(obb.length_direction).abs() > 1.0 - 1e-4
            {
                opening += cylinder.cross_section_area();
            }
            removed += 1;
            false
        });

        for face in result.faces_mut() {
            self.trim_pierced(face, &obb, span, opening);
        }
        result.retain_faces(|face| face.area > 0.0);

        let [l, w, h] = obb.axes();
        let half = obb.half_extents();
        let length = span.1 - span.0;
        let center = obb.center + l * ((span.0 + span.1) * 0.5);
        let walls = [
            (w, half.y, obb.height, h),
            (-w, half.y, obb.height, h),
            (h, half.z, obb.width, w),
            (-h, half.z, obb.width, w),
        ];
        for (offset_dir, offset, side, side_dir) in walls {
            let origin = center + offset_dir * offset;
            let along = l * (length * 0.5);
            let across = side_dir * (side * 0.5);
            let wall_bounds = BoundingBox::from_points([
                origin - along - across,
                origin - along + across,
                origin + along - across,
                origin + along + across,
            ]);
            // Wall normals point into the opening, away from the material
            result.add_face(
                Surface::plane(origin, -offset_dir),
                side * length,
                false,
                wall_bounds,
            );
        }

        tracing::debug!(
            "Subtracted tool {} from '{}': {} faces removed, {} -> {} faces",
            tool.id,
            target.name,
            removed,
            target.face_count(),
            result.face_count()
        );

        Ok(result)
    }

    fn discard(&self, solid: &Solid) -> CadResult<()> {
        self.solids
            .lock()
            .remove(&solid.id)
            .map(|_| ())
            .ok_or(CadError::SolidNotFound(solid.id))
    }
}

/// Points on a face used for containment tests
fn sample_points(face: &Face) -> Vec<Vec3> {
    match &face.surface {
        Surface::Cylinder(cylinder) if cylinder.radius > 0.0 && cylinder.axis != Vec3::ZERO => {
            let from_area = cylinder.length_for_area(face.area) * 0.5;
            let (mid, half) = if face.bounds.is_valid() {
                let (lo, hi) = face.bounds.extent_along(cylinder.origin, cylinder.axis);
                let from_bounds = (hi - lo) * 0.5;
                let half = if from_area > 0.0 {
                    from_area.min(from_bounds)
                } else {
                    from_bounds
                };
                ((lo + hi) * 0.5, half)
            } else {
                (0.0, from_area)
            };

            let u = perpendicular_to(cylinder.axis);
            let v = cylinder.axis.cross(u);
            let mut points = Vec::with_capacity(AXIAL_SAMPLES * RING_SAMPLES);
            for i in 0..AXIAL_SAMPLES {
                let t = mid - half + 2.0 * half * (i as f32 / (AXIAL_SAMPLES - 1) as f32);
                let ring_center = cylinder.origin + cylinder.axis * t;
                for j in 0..RING_SAMPLES {
                    let angle = TAU * j as f32 / RING_SAMPLES as f32;
                    let radial = (u * angle.cos() + v * angle.sin()) * cylinder.radius;
                    points.push(ring_center + radial);
                }
            }
            points
        }
        _ if face.bounds.is_valid() => face.bounds.corners().to_vec(),
        _ => Vec::new(),
    }
}
