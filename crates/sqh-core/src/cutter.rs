//! Boolean Cutter
//!
//! Materializes a cutting volume as a temporary kernel solid, subtracts it
//! from the target body in place and releases the solid again.

use serde::{Deserialize, Serialize};
use sqh_cad::{Body, BrepKernel};

use crate::error::{HoleError, HoleResult};
use crate::volume::CuttingVolume;

/// Result of a successful cut
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutOutcome {
    /// Face count before the cut
    pub faces_before: usize,
    /// Face count after the cut
    pub faces_after: usize,
}

/// Subtracts cutting volumes from bodies
pub struct BooleanCutter<'k> {
    kernel: &'k dyn BrepKernel,
}

impl<'k> BooleanCutter<'k> {
    pub fn new(kernel: &'k dyn BrepKernel) -> Self {
        Self { kernel }
    }

    /// Subtract `volume` from `body`
    ///
    /// On success the body's geometry is replaced, keeping its identity. On
    /// failure the body is left unchanged. The temporary tool solid is
    /// released in both cases.
    pub fn cut(&self, body: &mut Body, volume: &CuttingVolume) -> HoleResult<CutOutcome> {
        let obb = volume.to_oriented_box();
        let tool = self
            .kernel
            .create_box(&obb)
            .map_err(HoleError::from_kernel)?;

        let result = self.kernel.subtract(body, &tool);

        if let Err(e) = self.kernel.discard(&tool) {
            tracing::warn!("Failed to release tool solid {}: {}", tool.id, e);
        }

        let cut = result.map_err(HoleError::from_kernel)?;
        if cut.face_count() == 0 || !cut.bounds().is_valid() {
            return Err(HoleError::BooleanOperation(format!(
                "Cut of '{}' produced an empty body",
                body.name
            )));
        }

        let faces_before = body.face_count();
        body.replace_geometry(cut);

        tracing::debug!(
            "Cut '{}' with {}: {} -> {} faces",
            body.name,
            self.kernel.name(),
            faces_before,
            body.face_count()
        );

        Ok(CutOutcome {
            faces_before,
            faces_after: body.face_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::volume::VolumeBuilder;
    use glam::Vec3;
    use sqh_cad::{AnalyticKernel, NullKernel, block, drill_hole};

    fn drilled_plate() -> (Body, sqh_cad::FaceId) {
        let mut body =
            block("Plate", Vec3::new(0.0, 0.0, 5.0), Vec3::new(100.0, 100.0, 10.0)).unwrap();
        let id = drill_hole(&mut body, Vec3::ZERO, Vec3::Z, 5.0).unwrap();
        (body, id)
    }

    #[test]
    fn test_cut_replaces_hole_in_place() {
        let kernel = AnalyticKernel::new();
        let cutter = BooleanCutter::new(&kernel);
        let (mut body, hole) = drilled_plate();
        let body_id = body.id;

        let volume = VolumeBuilder::default()
            .build(body.face(hole).unwrap(), &body)
            .unwrap();
        let outcome = cutter.cut(&mut body, &volume).unwrap();

        assert_eq!(body.id, body_id);
        assert_eq!(body.name, "Plate");
        assert_eq!(outcome.faces_before, 7);
        assert_eq!(outcome.faces_after, body.face_count());
        assert!(body.face(hole).is_none());
        assert_eq!(classify(&body).count(), 0);
        assert!(body.faces().iter().all(|f| f.id.body_id == body_id));
    }

    #[test]
    fn test_tool_is_released() {
        let kernel = AnalyticKernel::new();
        let cutter = BooleanCutter::new(&kernel);
        let (mut body, hole) = drilled_plate();

        let volume = VolumeBuilder::default()
            .build(body.face(hole).unwrap(), &body)
            .unwrap();
        cutter.cut(&mut body, &volume).unwrap();
        assert_eq!(kernel.stored_solid_count(), 0);

        // Missing the body still releases the tool
        let mut missed = volume;
        missed.origin = Vec3::new(500.0, 500.0, 0.0);
        let result = cutter.cut(&mut body, &missed);
        assert!(matches!(result, Err(HoleError::BooleanOperation(_))));
        assert_eq!(kernel.stored_solid_count(), 0);
    }

    #[test]
    fn test_failed_cut_leaves_body_unchanged() {
        let kernel = AnalyticKernel::new();
        let cutter = BooleanCutter::new(&kernel);
        let (mut body, hole) = drilled_plate();
        let before = body.clone();

        let mut volume = VolumeBuilder::default()
            .build(body.face(hole).unwrap(), &body)
            .unwrap();
        volume.origin = Vec3::new(0.0, 500.0, 5.0);

        assert!(cutter.cut(&mut body, &volume).is_err());
        assert_eq!(body, before);
    }

    #[test]
    fn test_degenerate_volume_is_geometry_error() {
        let kernel = AnalyticKernel::new();
        let cutter = BooleanCutter::new(&kernel);
        let (mut body, hole) = drilled_plate();

        let mut volume = VolumeBuilder::default()
            .build(body.face(hole).unwrap(), &body)
            .unwrap();
        volume.width = 0.0;
        volume.height = 0.0;

        assert!(matches!(
            cutter.cut(&mut body, &volume),
            Err(HoleError::Geometry(_))
        ));
    }

    #[test]
    fn test_unavailable_kernel() {
        let kernel = NullKernel;
        let cutter = BooleanCutter::new(&kernel);
        let (mut body, hole) = drilled_plate();
        let volume = VolumeBuilder::default()
            .build(body.face(hole).unwrap(), &body)
            .unwrap();

        let err = cutter.cut(&mut body, &volume).unwrap_err();
        assert!(matches!(err, HoleError::Kernel(_)));
        assert!(!err.is_recoverable());
    }
}
