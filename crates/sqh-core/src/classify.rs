//! Face Classifier
//!
//! Selects the faces of a body that are bored round holes: cylindrical
//! surfaces whose orientation flag is reversed (concave). Bosses and shafts
//! share the surface type but are not reversed.

use sqh_cad::{Body, CylindricalSurface, Face, SurfaceKind};

use crate::error::{HoleError, HoleResult};

/// Returns true if the face is an inward cylindrical (hole) face
pub fn is_hole_face(face: &Face) -> bool {
    face.kind() == SurfaceKind::Cylinder && face.reversed
}

/// Lazily iterate over the qualifying faces of a body
///
/// Classification has no side effects; the iterator can be cloned or the
/// function called again after the body has been cut.
pub fn classify(body: &Body) -> HoleFaces<'_> {
    HoleFaces {
        faces: body.faces().iter(),
    }
}

/// Iterator over the hole faces of a body
#[derive(Debug, Clone)]
pub struct HoleFaces<'a> {
    faces: std::slice::Iter<'a, Face>,
}

impl<'a> Iterator for HoleFaces<'a> {
    type Item = &'a Face;

    fn next(&mut self) -> Option<Self::Item> {
        self.faces.find(|face| is_hole_face(face))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.faces.size_hint().1)
    }
}

/// Get the validated cylinder of a qualifying face
///
/// Fails with [`HoleError::Geometry`] for non-cylindrical faces, a
/// non-positive or non-finite radius, or a degenerate axis.
pub fn hole_surface(face: &Face) -> HoleResult<&CylindricalSurface> {
    let cylinder = face.surface.as_cylinder().ok_or_else(|| {
        HoleError::Geometry(format!("{} is a {}, not a cylinder", face.id, face.kind()))
    })?;

    if !(cylinder.radius.is_finite() && cylinder.radius > 0.0) {
        return Err(HoleError::Geometry(format!(
            "{} has invalid radius {}",
            face.id, cylinder.radius
        )));
    }

    if !(cylinder.axis.is_finite() && cylinder.axis.is_normalized()) {
        return Err(HoleError::Geometry(format!(
            "{} has a degenerate axis {}",
            face.id, cylinder.axis
        )));
    }

    if !cylinder.origin.is_finite() {
        return Err(HoleError::Geometry(format!(
            "{} has a non-finite origin",
            face.id
        )));
    }

    Ok(cylinder)
}
