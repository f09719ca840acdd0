//! Boundary representation of solid bodies
//!
//! A [`Body`] is described by its ordered set of [`Face`]s. Each face carries
//! its underlying analytic [`Surface`], its area, and the parametric
//! orientation flag that tells a bored hole apart from a boss of the same
//! surface type.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::BoundingBox;

/// Unique identifier for a face within a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FaceId {
    /// ID of the body this face belongs to
    pub body_id: Uuid,
    /// Index of the face within the body
    pub index: u32,
}

impl FaceId {
    /// Create a new face ID
    pub fn new(body_id: Uuid, index: u32) -> Self {
        Self { body_id, index }
    }
}

impl std::fmt::Display for FaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "face #{}", self.index)
    }
}

/// Cylindrical surface (infinite along its axis)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CylindricalSurface {
    /// A point on the cylinder axis
    pub origin: Vec3,
    /// Unit direction of the cylinder axis
    pub axis: Vec3,
    /// Cylinder radius
    pub radius: f32,
}

impl CylindricalSurface {
    /// Create a cylindrical surface
    ///
    /// The axis is normalized; the radius is stored as given so that invalid
    /// input can be detected downstream.
    pub fn new(origin: Vec3, axis: Vec3, radius: f32) -> Self {
        Self {
            origin,
            axis: axis.normalize_or_zero(),
            radius,
        }
    }

    /// Circumference of a cross section
    pub fn circumference(&self) -> f32 {
        TAU * self.radius
    }

    /// Area of a circular cross section
    pub fn cross_section_area(&self) -> f32 {
        PI * self.radius * self.radius
    }

    /// Axial length of a full cylindrical face with the given lateral area
    pub fn length_for_area(&self, area: f32) -> f32 {
        if self.radius > 0.0 {
            (area / self.circumference()).max(0.0)
        } else {
            0.0
        }
    }

    /// Bounding box of the finite cylinder of `length` centered on `origin`
    pub fn bounds(&self, length: f32) -> BoundingBox {
        let a = self.axis;
        let radial = Vec3::new(
            (1.0 - a.x * a.x).max(0.0).sqrt(),
            (1.0 - a.y * a.y).max(0.0).sqrt(),
            (1.0 - a.z * a.z).max(0.0).sqrt(),
        ) * self.radius;
        let axial = a.abs() * (length * 0.5);
        BoundingBox::from_center_half_extents(self.origin, radial + axial)
    }
}

/// Geometric kind of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceKind {
    Plane,
    Cylinder,
    Cone,
    Sphere,
    Torus,
    Freeform,
}

impl std::fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SurfaceKind::Plane => "plane",
            SurfaceKind::Cylinder => "cylinder",
            SurfaceKind::Cone => "cone",
            SurfaceKind::Sphere => "sphere",
            SurfaceKind::Torus => "torus",
            SurfaceKind::Freeform => "freeform",
        };
        f.write_str(name)
    }
}

/// Underlying surface of a face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Surface {
    /// Infinite plane
    Plane {
        /// A point on the plane
        origin: Vec3,
        /// Unit normal of the plane
        normal: Vec3,
    },
    /// Circular cylinder
    Cylinder(CylindricalSurface),
    /// Circular cone
    Cone {
        apex: Vec3,
        axis: Vec3,
        half_angle: f32,
    },
    /// Sphere
    Sphere { center: Vec3, radius: f32 },
    /// Torus
    Torus {
        center: Vec3,
        axis: Vec3,
        major_radius: f32,
        minor_radius: f32,
    },
    /// Any surface without an analytic description (NURBS, offsets, ...)
    Freeform,
}

impl Surface {
    /// Create a plane surface
    pub fn plane(origin: Vec3, normal: Vec3) -> Self {
        Surface::Plane {
            origin,
            normal: normal.normalize_or_zero(),
        }
    }

    /// Create a cylindrical surface
    pub fn cylinder(origin: Vec3, axis: Vec3, radius: f32) -> Self {
        Surface::Cylinder(CylindricalSurface::new(origin, axis, radius))
    }

    /// Get the geometric kind of this surface
    pub fn kind(&self) -> SurfaceKind {
        match self {
            Surface::Plane { .. } => SurfaceKind::Plane,
            Surface::Cylinder(_) => SurfaceKind::Cylinder,
            Surface::Cone { .. } => SurfaceKind::Cone,
            Surface::Sphere { .. } => SurfaceKind::Sphere,
            Surface::Torus { .. } => SurfaceKind::Torus,
            Surface::Freeform => SurfaceKind::Freeform,
        }
    }

    /// Get the cylinder parameters if this is a cylindrical surface
    pub fn as_cylinder(&self) -> Option<&CylindricalSurface> {
        match self {
            Surface::Cylinder(cylinder) => Some(cylinder),
            _ => None,
        }
    }
}

/// A boundary element of a body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    /// Unique identifier for this face
    pub id: FaceId,
    /// Underlying surface geometry
    pub surface: Surface,
    /// Area of the face
    pub area: f32,
    /// Whether the face normal opposes the surface's parametric normal
    ///
    /// For cylinders this marks an inward (concave) surface, i.e. a hole.
    pub reversed: bool,
    /// Bounding box of the trimmed face
    pub bounds: BoundingBox,
}

impl Face {
    /// Get the geometric kind of the underlying surface
    pub fn kind(&self) -> SurfaceKind {
        self.surface.kind()
    }
}

/// A solid body described by its bounding faces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Unique identifier
    pub id: Uuid,
    /// Name of the body
    pub name: String,
    /// Ordered set of boundary faces
    faces: Vec<Face>,
    /// Bounding box of the solid
    bounds: BoundingBox,
    /// Index handed to the next face added to this body
    next_face_index: u32,
}

impl Body {
    /// Create an empty body with the given name and solid bounds
    pub fn new(name: impl Into<String>, bounds: BoundingBox) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            faces: Vec::new(),
            bounds,
            next_face_index: 0,
        }
    }

    /// Get the bounding box of the solid
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Set the bounding box of the solid
    pub fn set_bounds(&mut self, bounds: BoundingBox) {
        self.bounds = bounds;
    }

    /// Get all faces in order
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Get mutable access to all faces
    pub fn faces_mut(&mut self) -> &mut [Face] {
        &mut self.faces
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Get a face by ID
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.iter().find(|f| f.id == id)
    }

    /// Add a face to the body, returns the new face ID
    pub fn add_face(
        &mut self,
        surface: Surface,
        area: f32,
        reversed: bool,
        bounds: BoundingBox,
    ) -> FaceId {
        let id = FaceId::new(self.id, self.next_face_index);
        self.next_face_index += 1;
        self.faces.push(Face {
            id,
            surface,
            area,
            reversed,
            bounds,
        });
        id
    }

    /// Remove faces that do not satisfy the predicate
    pub fn retain_faces(&mut self, keep: impl FnMut(&Face) -> bool) {
        self.faces.retain(keep);
    }

    /// Take over the geometry of `other`, keeping this body's identity
    ///
    /// Face IDs from `other` are re-homed onto this body.
    pub fn replace_geometry(&mut self, other: Body) {
        let id = self.id;
        self.faces = other
            .faces
            .into_iter()
            .map(|mut f| {
                f.id.body_id = id;
                f
            })
            .collect();
        self.bounds = other.bounds;
        self.next_face_index = self.next_face_index.max(other.next_face_index);
    }
}
