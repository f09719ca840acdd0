//! Progress reporting and cooperative cancellation
//!
//! The orchestrator talks to its host through two small traits: a
//! [`ProgressSink`] that receives progress updates and a [`CancelSignal`]
//! that is polled between units of work.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

/// Which level of the batch a progress update describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressScope {
    /// Bodies completed out of the selection
    Batch,
    /// Faces handled within the current body
    Body,
}

/// A single progress update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub scope: ProgressScope,
    pub current: usize,
    pub total: usize,
    /// Human-readable description of the step
    pub label: String,
}

impl Progress {
    pub fn batch(current: usize, total: usize, label: impl Into<String>) -> Self {
        Self {
            scope: ProgressScope::Batch,
            current,
            total,
            label: label.into(),
        }
    }

    pub fn body(current: usize, total: usize, label: impl Into<String>) -> Self {
        Self {
            scope: ProgressScope::Body,
            current,
            total,
            label: label.into(),
        }
    }

    /// Completed fraction in `[0, 1]`
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            (self.current as f32 / self.total as f32).clamp(0.0, 1.0)
        }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {}: {}", self.current, self.total, self.label)
    }
}

/// Receives progress updates from the orchestrator
pub trait ProgressSink {
    fn report(&mut self, progress: &Progress);

    /// Give the host a chance to service its own work (event loop, UI)
    fn checkpoint(&mut self) {}
}

impl<F> ProgressSink for F
where
    F: FnMut(&Progress),
{
    fn report(&mut self, progress: &Progress) {
        self(progress)
    }
}

/// Sink that drops every update
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&mut self, _progress: &Progress) {}
}

/// Sink that forwards updates to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&mut self, progress: &Progress) {
        match progress.scope {
            ProgressScope::Batch => tracing::info!("{}", progress),
            ProgressScope::Body => tracing::debug!("{}", progress),
        }
    }
}

/// Polled by the orchestrator to learn whether the host wants to stop
pub trait CancelSignal: Sync {
    fn is_cancelled(&self) -> bool;
}

impl<F> CancelSignal for F
where
    F: Fn() -> bool + Sync,
{
    fn is_cancelled(&self) -> bool {
        self()
    }
}

impl CancelSignal for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

/// Shared cancellation flag that can be handed to another thread
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

impl CancelSignal for CancellationToken {
    fn is_cancelled(&self) -> bool {
        CancellationToken::is_cancelled(self)
    }
}

/// Signal that never cancels
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverCancel;

impl CancelSignal for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}
