//! Body primitives
//!
//! Helpers that build analytic bodies: rectangular blocks, drilled through
//! holes (inward cylinders) and bosses (outward cylinders).

use glam::Vec3;

use crate::geometry::{BoundingBox, LINEAR_TOLERANCE};
use crate::kernel::{CadError, CadResult};
use crate::topology::{Body, CylindricalSurface, FaceId, Surface};

/// Create a rectangular block centered at `center`
///
/// Faces are ordered -X, +X, -Y, +Y, -Z, +Z.
pub fn block(name: impl Into<String>, center: Vec3, size: Vec3) -> CadResult<Body> {
    if !size.is_finite() || size.cmple(Vec3::ZERO).any() {
        return Err(CadError::InvalidGeometry(format!(
            "Block size must be positive, got {size}"
        )));
    }

    let half = size * 0.5;
    let bounds = BoundingBox::from_center_half_extents(center, half);
    let mut body = Body::new(name, bounds);

    for axis in 0..3 {
        let normal = Vec3::AXES[axis];
        let area = (size.x * size.y * size.z) / size[axis];
        for sign in [-1.0, 1.0] {
            let origin = center + normal * (sign * half[axis]);
            let mut face_half = half;
            face_half[axis] = 0.0;
            body.add_face(
                Surface::plane(origin, normal * sign),
                area,
                false,
                BoundingBox::from_center_half_extents(origin, face_half),
            );
        }
    }

    Ok(body)
}

/// Drill a round through hole into a body
///
/// The hole axis passes through `origin` along `axis` and spans the body's
/// bounds. Planar faces pierced by the axis lose the circular opening.
pub fn drill_hole(body: &mut Body, origin: Vec3, axis: Vec3, radius: f32) -> CadResult<FaceId> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(CadError::InvalidGeometry(format!(
            "Hole radius must be positive, got {radius}"
        )));
    }
    let axis = axis.try_normalize().ok_or_else(|| {
        CadError::InvalidGeometry("Hole axis must be a non-zero vector".into())
    })?;

    let (t0, t1) = body
        .bounds()
        .clip_line(origin, axis)
        .filter(|(t0, t1)| t1 - t0 > LINEAR_TOLERANCE)
        .ok_or_else(|| {
            CadError::InvalidGeometry(format!("Hole axis misses body '{}'", body.name))
        })?;

    let length = t1 - t0;
    let center = origin + axis * ((t0 + t1) * 0.5);
    let cylinder = CylindricalSurface::new(center, axis, radius);
    let opening = cylinder.cross_section_area();

    for face in body.faces_mut() {
        let Surface::Plane {
            origin: plane_origin,
            normal,
        } = face.surface
        else {
            continue;
        };
        let denom = normal.dot(axis);
        if denom.abs() < 1e-6 {
            continue;
        }
        let t = (plane_origin - center).dot(normal) / denom;
        let hit = center + axis * t;
        if face.bounds.contains_point_within(hit, LINEAR_TOLERANCE) {
            face.area = (face.area - opening / denom.abs()).max(0.0);
        }
    }

    Ok(body.add_face(
        Surface::Cylinder(cylinder),
        cylinder.circumference() * length,
        true,
        cylinder.bounds(length),
    ))
}

/// Add a cylindrical boss standing on `base` and extending along `axis`
///
/// Adds the outward cylinder and its planar end cap, and grows the body
/// bounds to include the boss.
pub fn add_boss(
    body: &mut Body,
    base: Vec3,
    axis: Vec3,
    radius: f32,
    height: f32,
) -> CadResult<FaceId> {
    if !(radius.is_finite() && radius > 0.0 && height.is_finite() && height > 0.0) {
        return Err(CadError::InvalidGeometry(format!(
            "Boss radius and height must be positive, got {radius} and {height}"
        )));
    }
    let axis = axis.try_normalize().ok_or_else(|| {
        CadError::InvalidGeometry("Boss axis must be a non-zero vector".into())
    })?;

    let cylinder = CylindricalSurface::new(base + axis * (height * 0.5), axis, radius);
    let cylinder_bounds = cylinder.bounds(height);

    let cap_center = base + axis * height;
    let cap = CylindricalSurface::new(cap_center, axis, radius);
    body.add_face(
        Surface::plane(cap_center, axis),
        cap.cross_section_area(),
        false,
        cap.bounds(0.0),
    );

    body.set_bounds(body.bounds().union(&cylinder_bounds));

    Ok(body.add_face(
        Surface::Cylinder(cylinder),
        cylinder.circumference() * height,
        false,
        cylinder_bounds,
    ))
}
