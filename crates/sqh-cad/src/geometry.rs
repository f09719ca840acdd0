//! Geometry value types
//!
//! Axes, axis-aligned bounding boxes and oriented boxes used to describe
//! bodies and the temporary tool solids cut out of them.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Default linear tolerance for geometric comparisons (model units)
pub const LINEAR_TOLERANCE: f32 = 1e-3;

/// Axis definition (origin and unit direction)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Axis3D {
    /// Origin point of the axis
    pub origin: Vec3,
    /// Direction of the axis (normalized)
    pub direction: Vec3,
}

impl Axis3D {
    /// Create an axis from origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Z axis at origin
    pub fn z() -> Self {
        Self::new(Vec3::ZERO, Vec3::Z)
    }

    /// Unit vector perpendicular to the axis direction
    ///
    /// Gram–Schmidt of the world axis least aligned with the direction, so
    /// the result is deterministic for a given direction.
    pub fn perpendicular(&self) -> Vec3 {
        perpendicular_to(self.direction)
    }
}

/// Unit vector perpendicular to `direction` (see [`Axis3D::perpendicular`])
pub fn perpendicular_to(direction: Vec3) -> Vec3 {
    let d = direction.normalize();
    let a = d.abs();
    let seed = if a.x <= a.y && a.x <= a.z {
        Vec3::X
    } else if a.y <= a.z {
        Vec3::Y
    } else {
        Vec3::Z
    };
    (seed - d * seed.dot(d)).normalize()
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl BoundingBox {
    /// Creates a new bounding box from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates an empty (inverted) bounding box
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    /// Creates a bounding box from a center point and half-extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Creates a bounding box that contains all given points
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        points
            .into_iter()
            .fold(Self::empty(), |bbox, point| bbox.expand_to_include(point))
    }

    /// Returns the center of the bounding box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the half-extents of the bounding box
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Returns the size (full extents) of the bounding box
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns true if the bounding box contains the given point
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.contains_point_within(point, 0.0)
    }

    /// Returns true if the point lies inside the box grown by `tolerance`
    pub fn contains_point_within(&self, point: Vec3, tolerance: f32) -> bool {
        point.cmpge(self.min - Vec3::splat(tolerance)).all()
            && point.cmple(self.max + Vec3::splat(tolerance)).all()
    }

    /// Returns the union of two bounding boxes
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns a new bounding box expanded to include the given point
    pub fn expand_to_include(&self, point: Vec3) -> BoundingBox {
        BoundingBox {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Returns true if the bounding box is valid (non-empty)
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all()
    }

    /// The eight corners of the box
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Interval of `(corner - origin) · direction` over all corners
    ///
    /// `direction` must be normalized.
    pub fn extent_along(&self, origin: Vec3, direction: Vec3) -> (f32, f32) {
        self.corners()
            .iter()
            .map(|c| (*c - origin).dot(direction))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), t| {
                (lo.min(t), hi.max(t))
            })
    }

    /// Clip the infinite line `origin + t * direction` against the box
    ///
    /// Returns the parameter interval inside the box, or `None` when the line
    /// misses it.
    pub fn clip_line(&self, origin: Vec3, direction: Vec3) -> Option<(f32, f32)> {
        if !self.is_valid() {
            return None;
        }

        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for i in 0..3 {
            let o = origin[i];
            let d = direction[i];
            let (lo, hi) = (self.min[i], self.max[i]);

            if d.abs() < f32::EPSILON {
                // Parallel to this slab
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let mut t0 = (lo - o) / d;
            let mut t1 = (hi - o) / d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some((t_min, t_max))
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

/// Rectangular box positioned by a center and an explicit axis triad
///
/// The length runs along `length_direction`, the width along
/// `width_direction` and the height along their cross product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedBox {
    /// Center point of the box
    pub center: Vec3,
    /// Unit direction of the length extent
    pub length_direction: Vec3,
    /// Unit direction of the width extent
    pub width_direction: Vec3,
    /// Unit direction of the height extent
    pub height_direction: Vec3,
    /// Full extent along the length direction
    pub length: f32,
    /// Full extent along the width direction
    pub width: f32,
    /// Full extent along the height direction
    pub height: f32,
}

impl OrientedBox {
    /// Create an oriented box
    ///
    /// `width_direction` is re-orthogonalized against `length_direction`.
    pub fn new(
        center: Vec3,
        length_direction: Vec3,
        width_direction: Vec3,
        length: f32,
        width: f32,
        height: f32,
    ) -> Self {
        let l = length_direction.normalize();
        let w = (width_direction - l * width_direction.dot(l)).normalize();
        let h = l.cross(w);
        Self {
            center,
            length_direction: l,
            width_direction: w,
            height_direction: h,
            length,
            width,
            height,
        }
    }

    /// Unit axes in (length, width, height) order
    pub fn axes(&self) -> [Vec3; 3] {
        [
            self.length_direction,
            self.width_direction,
            self.height_direction,
        ]
    }

    /// Half extents in (length, width, height) order
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.length, self.width, self.height) * 0.5
    }

    /// Box volume
    pub fn volume(&self) -> f32 {
        self.length * self.width * self.height
    }

    /// Returns true if all extents are positive and finite and the axes are valid
    pub fn is_valid(&self) -> bool {
        let extents = Vec3::new(self.length, self.width, self.height);
        extents.is_finite()
            && extents.cmpgt(Vec3::ZERO).all()
            && self.center.is_finite()
            && self.axes().iter().all(|a| a.is_finite() && a.is_normalized())
    }

    /// Returns true if the point lies inside the box grown by `tolerance`
    pub fn contains_point(&self, point: Vec3, tolerance: f32) -> bool {
        let v = point - self.center;
        let half = self.half_extents();
        self.axes()
            .iter()
            .zip([half.x, half.y, half.z])
            .all(|(axis, h)| v.dot(*axis).abs() <= h + tolerance)
    }

    /// The eight corners of the box
    pub fn corners(&self) -> [Vec3; 8] {
        let half = self.half_extents();
        let [l, w, h] = self.axes();
        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let sl = if i & 1 == 0 { -1.0 } else { 1.0 };
            let sw = if i & 2 == 0 { -1.0 } else { 1.0 };
            let sh = if i & 4 == 0 { -1.0 } else { 1.0 };
            *corner = self.center + l * (sl * half.x) + w * (sw * half.y) + h * (sh * half.z);
        }
        corners
    }

    /// Separating-axis test against an axis-aligned box
    pub fn intersects_aabb(&self, aabb: &BoundingBox, tolerance: f32) -> bool {
        if !aabb.is_valid() {
            return false;
        }

        let a_axes = [Vec3::X, Vec3::Y, Vec3::Z];
        let a_half = aabb.half_extents();
        let b_axes = self.axes();
        let b_half = self.half_extents();
        let offset = self.center - aabb.center();

        let separated = |axis: Vec3| {
            let ra = a_axes
                .iter()
                .zip([a_half.x, a_half.y, a_half.z])
                .map(|(a, h)| a.dot(axis).abs() * h)
                .sum::<f32>();
            let rb = b_axes
                .iter()
                .zip([b_half.x, b_half.y, b_half.z])
                .map(|(b, h)| b.dot(axis).abs() * h)
                .sum::<f32>();
            offset.dot(axis).abs() > ra + rb + tolerance
        };

        for axis in a_axes.iter().chain(b_axes.iter()) {
            if separated(*axis) {
                return false;
            }
        }

        for a in &a_axes {
            for b in &b_axes {
                let axis = a.cross(*b);
                // Parallel edges produce no new separating axis
                if axis.length_squared() < 1e-8 {
                    continue;
                }
                if separated(axis.normalize()) {
                    return false;
                }
            }
        }

        true
    }
}
