//! Batch Orchestrator
//!
//! Runs classification, volume building and cutting over a selection of
//! bodies, one face at a time. Each body moves through
//! `Pending -> Processing -> Done`, or ends up `Cancelled` when the host
//! asks to stop between faces. Cuts already applied are kept.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use sqh_cad::{Body, BrepKernel, CadError, FaceId};
use uuid::Uuid;

use crate::classify::{classify, hole_surface};
use crate::config::ConversionConfig;
use crate::cutter::BooleanCutter;
use crate::error::{HoleError, HoleResult};
use crate::progress::{CancelSignal, Progress, ProgressSink};
use crate::volume::{CuttingVolume, VolumeBuilder};

/// Overall outcome of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    Completed,
    Cancelled,
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchStatus::Completed => write!(f, "completed"),
            BatchStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Processing state of a single body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyState {
    Pending,
    Processing,
    Done,
    Cancelled,
}

/// Why a face was not converted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Degenerate hole surface
    Geometry,
    /// Subtraction failed
    BooleanOperation,
    /// Kernel failure unrelated to the face geometry
    Kernel,
}

impl From<&HoleError> for SkipReason {
    fn from(error: &HoleError) -> Self {
        match error {
            HoleError::Geometry(_) => SkipReason::Geometry,
            HoleError::BooleanOperation(_) => SkipReason::BooleanOperation,
            _ => SkipReason::Kernel,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Geometry => write!(f, "geometry"),
            SkipReason::BooleanOperation => write!(f, "boolean operation"),
            SkipReason::Kernel => write!(f, "kernel"),
        }
    }
}

/// A face that was attempted but not converted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedFace {
    pub face_id: FaceId,
    pub reason: SkipReason,
    pub message: String,
}

/// A converted hole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutRecord {
    /// Face that was replaced
    pub face_id: FaceId,
    /// Radius of the round hole
    pub radius: f32,
    /// Axial length of the round hole
    pub hole_length: f32,
    /// Volume that was subtracted
    pub volume: CuttingVolume,
}

/// Per-body outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyReport {
    pub body_id: Uuid,
    pub name: String,
    pub state: BodyState,
    /// Hole faces found when the body was first classified
    pub qualifying: usize,
    pub cuts: Vec<CutRecord>,
    pub skipped: Vec<SkippedFace>,
}

impl BodyReport {
    fn pending(body: &Body) -> Self {
        Self {
            body_id: body.id,
            name: body.name.clone(),
            state: BodyState::Pending,
            qualifying: 0,
            cuts: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Result of a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub status: BatchStatus,
    pub bodies: Vec<BodyReport>,
}

impl BatchResult {
    /// Number of bodies fully processed
    pub fn bodies_done(&self) -> usize {
        self.bodies
            .iter()
            .filter(|b| b.state == BodyState::Done)
            .count()
    }

    pub fn faces_cut(&self) -> usize {
        self.bodies.iter().map(|b| b.cuts.len()).sum()
    }

    pub fn faces_skipped(&self) -> usize {
        self.bodies.iter().map(|b| b.skipped.len()).sum()
    }

    /// Treat a cancelled batch as an error
    pub fn ensure_completed(self) -> HoleResult<Self> {
        match self.status {
            BatchStatus::Completed => Ok(self),
            BatchStatus::Cancelled => Err(HoleError::CancellationRequested),
        }
    }

    /// User-visible summary of the run
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            status: self.status,
            bodies_total: self.bodies.len(),
            bodies_done: self.bodies_done(),
            faces_cut: self.faces_cut(),
            faces_skipped: self.faces_skipped(),
        }
    }
}

impl fmt::Display for BatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())?;
        for body in &self.bodies {
            for skipped in &body.skipped {
                write!(
                    f,
                    "\n  skipped {} of '{}' ({}): {}",
                    skipped.face_id, body.name, skipped.reason, skipped.message
                )?;
            }
        }
        Ok(())
    }
}

/// Counts shown to the user after a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub status: BatchStatus,
    pub bodies_total: usize,
    pub bodies_done: usize,
    pub faces_cut: usize,
    pub faces_skipped: usize,
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Batch {}: {} of {} bodies processed, {} holes squared, {} skipped",
            self.status, self.bodies_done, self.bodies_total, self.faces_cut, self.faces_skipped
        )
    }
}

/// Drives the conversion of a selection of bodies
pub struct BatchOrchestrator<'k> {
    kernel: &'k dyn BrepKernel,
    config: ConversionConfig,
}

impl<'k> BatchOrchestrator<'k> {
    pub fn new(kernel: &'k dyn BrepKernel, config: ConversionConfig) -> Self {
        Self { kernel, config }
    }

    /// Convert every round hole in `bodies`
    ///
    /// Bodies are cut in place. Invalid input fails before any cut is made;
    /// per-face failures are recorded in the result and skipped.
    pub fn process(
        &self,
        bodies: &mut [Body],
        cancel: &dyn CancelSignal,
        progress: &mut dyn ProgressSink,
    ) -> HoleResult<BatchResult> {
        self.validate(bodies)?;

        let total = bodies.len();
        let mut reports: Vec<BodyReport> = bodies.iter().map(BodyReport::pending).collect();
        let mut status = BatchStatus::Completed;

        tracing::info!("Converting holes in {} bodies with {}", total, self.kernel.name());

        for (index, (body, report)) in bodies.iter_mut().zip(reports.iter_mut()).enumerate() {
            if cancel.is_cancelled() {
                tracing::info!("Cancelled before '{}'", body.name);
                status = BatchStatus::Cancelled;
                break;
            }

            self.process_body(body, report, cancel, progress);
            if report.state == BodyState::Cancelled {
                status = BatchStatus::Cancelled;
                break;
            }

            progress.report(&Progress::batch(index + 1, total, body.name.clone()));
            progress.checkpoint();
        }

        let result = BatchResult {
            status,
            bodies: reports,
        };
        tracing::info!("{}", result.summary());
        Ok(result)
    }

    /// Convert independent bodies on the rayon thread pool
    ///
    /// Each body is handled by a single worker. Progress updates are
    /// serialized, so the sink sees batch updates in completion order.
    #[cfg(feature = "parallel")]
    pub fn process_parallel(
        &self,
        bodies: &mut [Body],
        cancel: &dyn CancelSignal,
        progress: &mut (dyn ProgressSink + Send),
    ) -> HoleResult<BatchResult> {
        use parking_lot::Mutex;
        use rayon::prelude::*;
        use std::sync::atomic::{AtomicUsize, Ordering};

        self.validate(bodies)?;

        let total = bodies.len();
        let mut reports: Vec<BodyReport> = bodies.iter().map(BodyReport::pending).collect();
        let sink = Mutex::new(progress);
        let completed = AtomicUsize::new(0);

        tracing::info!(
            "Converting holes in {} bodies with {} on {} threads",
            total,
            self.kernel.name(),
            rayon::current_num_threads()
        );

        bodies
            .par_iter_mut()
            .zip(reports.par_iter_mut())
            .for_each(|(body, report)| {
                if cancel.is_cancelled() {
                    return;
                }
                let mut shared = SharedSink { inner: &sink };
                self.process_body(body, report, cancel, &mut shared);
                if report.state == BodyState::Done {
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    let mut guard = sink.lock();
                    guard.report(&Progress::batch(done, total, body.name.clone()));
                    guard.checkpoint();
                }
            });

        let status = if reports.iter().all(|r| r.state == BodyState::Done) {
            BatchStatus::Completed
        } else {
            BatchStatus::Cancelled
        };
        let result = BatchResult {
            status,
            bodies: reports,
        };
        tracing::info!("{}", result.summary());
        Ok(result)
    }

    /// Reject input that must not start a batch
    fn validate(&self, bodies: &[Body]) -> HoleResult<()> {
        if bodies.is_empty() {
            return Err(HoleError::InvalidSelection("no bodies selected".into()));
        }

        let mut seen = HashSet::new();
        for body in bodies {
            if !seen.insert(body.id) {
                return Err(HoleError::InvalidSelection(format!(
                    "body '{}' ({}) is selected more than once",
                    body.name, body.id
                )));
            }
        }

        if !self.kernel.is_available() {
            return Err(HoleError::Kernel(CadError::KernelNotAvailable(format!(
                "kernel '{}' cannot perform cuts",
                self.kernel.name()
            ))));
        }

        Ok(())
    }

    /// Cut every hole of one body, re-classifying after each cut
    fn process_body(
        &self,
        body: &mut Body,
        report: &mut BodyReport,
        cancel: &dyn CancelSignal,
        progress: &mut dyn ProgressSink,
    ) {
        let builder = VolumeBuilder::new(self.config.cut_length);
        let cutter = BooleanCutter::new(self.kernel);

        report.state = BodyState::Processing;
        report.qualifying = classify(body).count();
        tracing::info!("'{}': {} round holes", body.name, report.qualifying);

        let mut attempted: HashSet<FaceId> = HashSet::new();

        loop {
            let Some(face) = classify(body).find(|f| !attempted.contains(&f.id)).cloned() else {
                break;
            };

            if attempted.len() >= self.config.max_cuts_per_body {
                tracing::warn!(
                    "'{}': stopping after {} attempts",
                    body.name,
                    self.config.max_cuts_per_body
                );
                break;
            }

            if self.config.check_cancel_per_face && cancel.is_cancelled() {
                tracing::info!("'{}': cancelled before {}", body.name, face.id);
                report.state = BodyState::Cancelled;
                return;
            }

            attempted.insert(face.id);

            let bounds = self.kernel.bounding_box(body);
            let outcome = builder.build_within(&face, &bounds).and_then(|volume| {
                cutter.cut(body, &volume)?;
                Ok(volume)
            });

            match outcome {
                Ok(volume) => {
                    let (radius, hole_length) = hole_surface(&face)
                        .map(|c| (c.radius, c.length_for_area(face.area)))
                        .unwrap_or_default();
                    tracing::debug!(
                        "'{}': squared {} (r = {}, length = {})",
                        body.name,
                        face.id,
                        radius,
                        hole_length
                    );
                    report.cuts.push(CutRecord {
                        face_id: face.id,
                        radius,
                        hole_length,
                        volume,
                    });
                }
                Err(e) => {
                    tracing::warn!("'{}': skipping {}: {}", body.name, face.id, e);
                    report.skipped.push(SkippedFace {
                        face_id: face.id,
                        reason: SkipReason::from(&e),
                        message: e.to_string(),
                    });
                }
            }

            let handled = attempted.len();
            progress.report(&Progress::body(
                handled,
                report.qualifying.max(handled),
                format!("{} {}", body.name, face.id),
            ));
            progress.checkpoint();
        }

        report.state = BodyState::Done;
    }
}

/// Forwards updates from a worker to the shared sink
#[cfg(feature = "parallel")]
struct SharedSink<'a, 'b> {
    inner: &'a parking_lot::Mutex<&'b mut (dyn ProgressSink + Send)>,
}

#[cfg(feature = "parallel")]
impl ProgressSink for SharedSink<'_, '_> {
    fn report(&mut self, progress: &Progress) {
        self.inner.lock().report(progress);
    }

    fn checkpoint(&mut self) {
        self.inner.lock().checkpoint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CutLength;
    use crate::progress::{CancellationToken, NeverCancel, NullProgress, ProgressScope};
    use approx::assert_relative_eq;
    use glam::Vec3;
    use sqh_cad::{AnalyticKernel, BoundingBox, NullKernel, Surface, add_boss, block, drill_hole};

    fn plate(name: &str, holes: &[Vec3]) -> Body {
        let mut body =
            block(name, Vec3::new(0.0, 0.0, 5.0), Vec3::new(100.0, 100.0, 10.0)).unwrap();
        for origin in holes {
            drill_hole(&mut body, *origin, Vec3::Z, 5.0).unwrap();
        }
        body
    }

    #[test]
    fn test_three_face_body_gets_one_cut() {
        let bounds = BoundingBox::new(Vec3::new(-50.0, -50.0, 0.0), Vec3::new(50.0, 50.0, 10.0));
        let mut body = Body::new("Three faces", bounds);
        let hole = sqh_cad::CylindricalSurface::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z, 5.0);
        body.add_face(
            Surface::Cylinder(hole),
            hole.circumference() * 10.0,
            true,
            hole.bounds(10.0),
        );
        let boss = sqh_cad::CylindricalSurface::new(Vec3::new(25.0, 0.0, 5.0), Vec3::Z, 5.0);
        body.add_face(
            Surface::Cylinder(boss),
            boss.circumference() * 10.0,
            false,
            boss.bounds(10.0),
        );
        body.add_face(
            Surface::plane(Vec3::new(0.0, 0.0, 10.0), Vec3::Z),
            10000.0,
            false,
            BoundingBox::new(Vec3::new(-50.0, -50.0, 10.0), Vec3::new(50.0, 50.0, 10.0)),
        );

        let kernel = AnalyticKernel::new();
        let orchestrator = BatchOrchestrator::new(&kernel, ConversionConfig::default());
        let mut bodies = vec![body];
        let result = orchestrator
            .process(&mut bodies, &NeverCancel, &mut NullProgress)
            .unwrap();

        assert_eq!(result.status, BatchStatus::Completed);
        let report = &result.bodies[0];
        assert_eq!(report.state, BodyState::Done);
        assert_eq!(report.qualifying, 1);
        assert_eq!(report.cuts.len(), 1);
        assert!(report.skipped.is_empty());
        assert_eq!(report.cuts[0].radius, 5.0);
        assert_relative_eq!(report.cuts[0].hole_length, 10.0, epsilon = 1e-3);
        assert_eq!(report.cuts[0].volume.width, 10.0);

        // Boss survives, hole does not come back
        assert_eq!(classify(&bodies[0]).count(), 0);
        assert!(bodies[0].faces().iter().any(|f| f.surface.as_cylinder().is_some() && !f.reversed));
        assert_eq!(kernel.stored_solid_count(), 0);
    }

    #[test]
    fn test_cancel_after_second_body() {
        let mut bodies: Vec<Body> = (0..5)
            .map(|i| plate(&format!("Plate {i}"), &[Vec3::ZERO]))
            .collect();
        let ids: Vec<Uuid> = bodies.iter().map(|b| b.id).collect();

        let kernel = AnalyticKernel::new();
        let orchestrator = BatchOrchestrator::new(&kernel, ConversionConfig::default());
        let token = CancellationToken::new();
        let mut sink = |p: &Progress| {
            if p.scope == ProgressScope::Batch && p.current == 2 {
                token.cancel();
            }
        };

        let result = orchestrator.process(&mut bodies, &token, &mut sink).unwrap();

        assert_eq!(result.status, BatchStatus::Cancelled);
        assert_eq!(result.bodies_done(), 2);
        let states: Vec<_> = result.bodies.iter().map(|b| b.state).collect();
        assert_eq!(
            states,
            vec![
                BodyState::Done,
                BodyState::Done,
                BodyState::Pending,
                BodyState::Pending,
                BodyState::Pending
            ]
        );
        assert_eq!(classify(&bodies[1]).count(), 0);
        assert_eq!(classify(&bodies[2]).count(), 1);
        assert_eq!(
            result.bodies.iter().map(|b| b.body_id).collect::<Vec<_>>(),
            ids
        );
        assert!(matches!(
            result.ensure_completed(),
            Err(HoleError::CancellationRequested)
        ));
    }

    #[test]
    fn test_cancel_between_faces_keeps_cuts() {
        let mut bodies = vec![plate(
            "Two holes",
            &[Vec3::new(-20.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0)],
        )];

        let kernel = AnalyticKernel::new();
        let orchestrator = BatchOrchestrator::new(&kernel, ConversionConfig::default());
        let token = CancellationToken::new();
        let mut sink = |p: &Progress| {
            if p.scope == ProgressScope::Body {
                token.cancel();
            }
        };

        let result = orchestrator.process(&mut bodies, &token, &mut sink).unwrap();

        assert_eq!(result.status, BatchStatus::Cancelled);
        assert_eq!(result.bodies[0].state, BodyState::Cancelled);
        assert_eq!(result.bodies[0].cuts.len(), 1);
        assert_eq!(classify(&bodies[0]).count(), 1);
    }

    #[test]
    fn test_cancel_only_between_bodies() {
        let mut bodies: Vec<Body> = (0..3)
            .map(|i| {
                plate(
                    &format!("Plate {i}"),
                    &[Vec3::new(-20.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0)],
                )
            })
            .collect();

        let kernel = AnalyticKernel::new();
        let config = ConversionConfig {
            check_cancel_per_face: false,
            ..Default::default()
        };
        let orchestrator = BatchOrchestrator::new(&kernel, config);
        let token = CancellationToken::new();
        let mut sink = |p: &Progress| {
            if p.scope == ProgressScope::Body {
                token.cancel();
            }
        };

        let result = orchestrator.process(&mut bodies, &token, &mut sink).unwrap();

        assert_eq!(result.status, BatchStatus::Cancelled);
        let states: Vec<_> = result.bodies.iter().map(|b| b.state).collect();
        assert_eq!(
            states,
            vec![BodyState::Done, BodyState::Pending, BodyState::Pending]
        );
        assert_eq!(result.bodies[0].cuts.len(), 2);
        assert_eq!(classify(&bodies[0]).count(), 0);
        assert_eq!(classify(&bodies[1]).count(), 2);
    }

    /// Analytic kernel that reports grown body bounds
    struct PaddedKernel {
        inner: AnalyticKernel,
        padding: f32,
    }

    impl BrepKernel for PaddedKernel {
        fn name(&self) -> &str {
            "padded"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn create_box(&self, obb: &sqh_cad::OrientedBox) -> sqh_cad::CadResult<sqh_cad::Solid> {
            self.inner.create_box(obb)
        }

        fn subtract(&self, target: &Body, tool: &sqh_cad::Solid) -> sqh_cad::CadResult<Body> {
            self.inner.subtract(target, tool)
        }

        fn discard(&self, solid: &sqh_cad::Solid) -> sqh_cad::CadResult<()> {
            self.inner.discard(solid)
        }

        fn bounding_box(&self, body: &Body) -> BoundingBox {
            let bounds = body.bounds();
            BoundingBox::from_center_half_extents(
                bounds.center(),
                bounds.half_extents() + Vec3::splat(self.padding),
            )
        }
    }

    #[test]
    fn test_cut_length_uses_kernel_bounds() {
        let kernel = PaddedKernel {
            inner: AnalyticKernel::new(),
            padding: 20.0,
        };
        let config = ConversionConfig {
            cut_length: CutLength::FitToBody { margin: 0.0 },
            ..Default::default()
        };
        let mut bodies = vec![plate("Plate", &[Vec3::ZERO])];
        let result = BatchOrchestrator::new(&kernel, config)
            .process(&mut bodies, &NeverCancel, &mut NullProgress)
            .unwrap();

        // Plate spans z 0..10, the kernel reports -20..30 around the hole at z = 5
        let cut = &result.bodies[0].cuts[0];
        assert_relative_eq!(cut.volume.length, 50.0, epsilon = 1e-4);
        assert_eq!(classify(&bodies[0]).count(), 0);
        assert_eq!(kernel.inner.stored_solid_count(), 0);
    }

    #[test]
    fn test_non_intersecting_face_is_skipped() {
        let mut body = plate("Plate", &[]);
        let stray = sqh_cad::CylindricalSurface::new(Vec3::new(500.0, 0.0, 5.0), Vec3::Z, 5.0);
        let stray_id = body.add_face(
            Surface::Cylinder(stray),
            stray.circumference() * 10.0,
            true,
            stray.bounds(10.0),
        );
        drill_hole(&mut body, Vec3::ZERO, Vec3::Z, 5.0).unwrap();

        let kernel = AnalyticKernel::new();
        let orchestrator = BatchOrchestrator::new(&kernel, ConversionConfig::default());
        let mut bodies = vec![body];
        let result = orchestrator
            .process(&mut bodies, &NeverCancel, &mut NullProgress)
            .unwrap();

        let report = &result.bodies[0];
        assert_eq!(result.status, BatchStatus::Completed);
        assert_eq!(report.state, BodyState::Done);
        assert_eq!(report.qualifying, 2);
        assert_eq!(report.cuts.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].face_id, stray_id);
        assert_eq!(report.skipped[0].reason, SkipReason::BooleanOperation);
        assert!(
            result
                .to_string()
                .contains("skipped face #6 of 'Plate' (boolean operation)")
        );

        // The stray face is still a hole, but it was not retried
        assert_eq!(classify(&bodies[0]).count(), 1);
        assert_eq!(kernel.stored_solid_count(), 0);
    }

    #[test]
    fn test_degenerate_face_is_skipped() {
        let mut body = plate("Plate", &[Vec3::ZERO]);
        let bounds = body.bounds();
        body.add_face(
            Surface::cylinder(Vec3::new(30.0, 30.0, 5.0), Vec3::Z, 0.0),
            100.0,
            true,
            bounds,
        );

        let kernel = AnalyticKernel::new();
        let orchestrator = BatchOrchestrator::new(&kernel, ConversionConfig::default());
        let mut bodies = vec![body];
        let result = orchestrator
            .process(&mut bodies, &NeverCancel, &mut NullProgress)
            .unwrap();

        let report = &result.bodies[0];
        assert_eq!(report.cuts.len(), 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, SkipReason::Geometry);
    }

    #[test]
    fn test_progress_reports() {
        let mut bodies = vec![
            plate("A", &[Vec3::new(-20.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0)]),
            plate("B", &[Vec3::ZERO]),
        ];

        let kernel = AnalyticKernel::new();
        let orchestrator = BatchOrchestrator::new(&kernel, ConversionConfig::default());
        let mut updates = Vec::new();
        let mut sink = |p: &Progress| updates.push((p.scope, p.current, p.total));

        orchestrator
            .process(&mut bodies, &NeverCancel, &mut sink)
            .unwrap();

        assert_eq!(
            updates,
            vec![
                (ProgressScope::Body, 1, 2),
                (ProgressScope::Body, 2, 2),
                (ProgressScope::Batch, 1, 2),
                (ProgressScope::Body, 1, 1),
                (ProgressScope::Batch, 2, 2),
            ]
        );
    }

    #[test]
    fn test_max_cuts_per_body() {
        let mut bodies = vec![plate(
            "Two holes",
            &[Vec3::new(-20.0, 0.0, 0.0), Vec3::new(20.0, 0.0, 0.0)],
        )];

        let kernel = AnalyticKernel::new();
        let config = ConversionConfig {
            max_cuts_per_body: 1,
            ..Default::default()
        };
        let result = BatchOrchestrator::new(&kernel, config)
            .process(&mut bodies, &NeverCancel, &mut NullProgress)
            .unwrap();

        assert_eq!(result.bodies[0].state, BodyState::Done);
        assert_eq!(result.bodies[0].cuts.len(), 1);
    }

    #[test]
    fn test_bosses_are_left_alone() {
        let mut body = block("Base", Vec3::ZERO, Vec3::splat(20.0)).unwrap();
        add_boss(&mut body, Vec3::new(0.0, 0.0, 10.0), Vec3::Z, 3.0, 10.0).unwrap();
        let before = body.clone();

        let kernel = AnalyticKernel::new();
        let mut bodies = vec![body];
        let result = BatchOrchestrator::new(&kernel, ConversionConfig::default())
            .process(&mut bodies, &NeverCancel, &mut NullProgress)
            .unwrap();

        assert_eq!(result.faces_cut(), 0);
        assert_eq!(result.bodies[0].state, BodyState::Done);
        assert_eq!(bodies[0], before);
    }

    #[test]
    fn test_invalid_selection_fails_before_cutting() {
        let kernel = AnalyticKernel::new();
        let orchestrator = BatchOrchestrator::new(&kernel, ConversionConfig::default());

        let result = orchestrator.process(&mut [], &NeverCancel, &mut NullProgress);
        assert!(matches!(result, Err(HoleError::InvalidSelection(_))));

        let body = plate("Plate", &[Vec3::ZERO]);
        let mut duplicated = vec![body.clone(), body.clone()];
        let result = orchestrator.process(&mut duplicated, &NeverCancel, &mut NullProgress);
        assert!(matches!(result, Err(HoleError::InvalidSelection(_))));
        assert_eq!(duplicated[0], body);

        let null = NullKernel;
        let mut bodies = vec![body.clone()];
        let result = BatchOrchestrator::new(&null, ConversionConfig::default()).process(
            &mut bodies,
            &NeverCancel,
            &mut NullProgress,
        );
        assert!(matches!(result, Err(HoleError::Kernel(_))));
        assert_eq!(bodies[0], body);
    }

    #[test]
    fn test_summary() {
        let mut bodies = vec![plate("Plate", &[Vec3::ZERO])];
        let kernel = AnalyticKernel::new();
        let result = BatchOrchestrator::new(&kernel, ConversionConfig::default())
            .process(&mut bodies, &NeverCancel, &mut NullProgress)
            .unwrap();

        let summary = result.summary();
        assert_eq!(summary.bodies_total, 1);
        assert_eq!(summary.bodies_done, 1);
        assert_eq!(summary.faces_cut, 1);
        assert_eq!(
            summary.to_string(),
            "Batch completed: 1 of 1 bodies processed, 1 holes squared, 0 skipped"
        );

        let json = serde_json::to_string(&result).unwrap();
        let parsed: BatchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let make = || -> Vec<Body> {
            (0..6)
                .map(|i| {
                    plate(
                        &format!("Plate {i}"),
                        &[Vec3::new(-20.0, 0.0, 0.0), Vec3::new(20.0, 10.0, 0.0)],
                    )
                })
                .collect()
        };

        let kernel = AnalyticKernel::new();
        let orchestrator = BatchOrchestrator::new(&kernel, ConversionConfig::default());

        let mut sequential = make();
        let expected = orchestrator
            .process(&mut sequential, &NeverCancel, &mut NullProgress)
            .unwrap();

        let mut parallel = make();
        let mut batch_updates = 0;
        let mut sink = |p: &Progress| {
            if p.scope == ProgressScope::Batch {
                batch_updates += 1;
            }
        };
        let result = orchestrator
            .process_parallel(&mut parallel, &NeverCancel, &mut sink)
            .unwrap();

        assert_eq!(result.status, BatchStatus::Completed);
        assert_eq!(result.faces_cut(), expected.faces_cut());
        assert_eq!(batch_updates, 6);
        assert!(parallel.iter().all(|b| classify(b).count() == 0));
        assert_eq!(kernel.stored_solid_count(), 0);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_cancellation() {
        let mut bodies: Vec<Body> = (0..64)
            .map(|i| plate(&format!("Plate {i}"), &[Vec3::ZERO]))
            .collect();

        let kernel = AnalyticKernel::new();
        let orchestrator = BatchOrchestrator::new(&kernel, ConversionConfig::default());
        let token = CancellationToken::new();
        let mut sink = |p: &Progress| {
            if p.scope == ProgressScope::Batch && p.current == 2 {
                token.cancel();
            }
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(2)
            .build()
            .unwrap();
        let result = pool
            .install(|| orchestrator.process_parallel(&mut bodies, &token, &mut sink))
            .unwrap();

        assert_eq!(result.status, BatchStatus::Cancelled);
        assert!(result.bodies_done() >= 2);
        assert!(
            result
                .bodies
                .iter()
                .all(|b| b.state != BodyState::Processing)
        );
        assert!(
            result
                .bodies
                .iter()
                .any(|b| b.state == BodyState::Pending)
        );
        assert_eq!(kernel.stored_solid_count(), 0);
    }
}
