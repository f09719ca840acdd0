//! Round-to-square hole conversion
//!
//! This crate provides:
//! - Hole face classification
//! - Cutting volume construction
//! - Boolean cutting through a [`sqh_cad::BrepKernel`]
//! - Batch orchestration with progress reporting and cancellation
//! - Conversion configuration and selection files

pub mod batch;
pub mod classify;
pub mod config;
pub mod cutter;
pub mod error;
pub mod progress;
pub mod selection;
pub mod volume;

// Re-exports for convenience
pub use batch::{
    BatchOrchestrator, BatchResult, BatchStatus, BatchSummary, BodyReport, BodyState, CutRecord,
    SkipReason, SkippedFace,
};
pub use classify::{HoleFaces, classify, hole_surface, is_hole_face};
pub use config::{ConfigError, ConversionConfig, CutLength, DEFAULT_CUT_LENGTH};
pub use cutter::{BooleanCutter, CutOutcome};
pub use error::{HoleError, HoleResult};
pub use progress::{
    CancelSignal, CancellationToken, NeverCancel, NullProgress, Progress, ProgressScope,
    ProgressSink, TracingProgress,
};
pub use selection::{SELECTION_VERSION, Selection, SelectionError};
pub use volume::{CuttingVolume, VolumeBuilder};
