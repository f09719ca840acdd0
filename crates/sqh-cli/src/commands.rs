//! Subcommand implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glam::Vec3;
use sqh_cad::{Body, BrepKernel, add_boss, block, default_kernel, drill_hole};
use sqh_core::{
    BatchOrchestrator, BatchResult, ConversionConfig, CutLength, HoleResult, NeverCancel,
    Selection, TracingProgress,
};

/// Settings of the `convert` subcommand
#[derive(Debug, Default)]
pub struct ConvertOptions {
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub fit_margin: Option<f32>,
    pub cut_length: Option<f32>,
    pub json: Option<PathBuf>,
    pub parallel: bool,
}

impl ConvertOptions {
    /// Load the config file, if any, and apply flag overrides
    pub fn resolve_config(&self) -> Result<ConversionConfig> {
        let mut config = match &self.config {
            Some(path) => ConversionConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ConversionConfig::default(),
        };

        if let Some(margin) = self.fit_margin {
            config.cut_length = CutLength::FitToBody { margin };
        }
        if let Some(length) = self.cut_length {
            config.cut_length = CutLength::Fixed(length);
        }
        if self.parallel {
            config.parallel = true;
        }

        config.validate().context("Invalid conversion settings")?;
        Ok(config)
    }

    /// Where the converted selection is written
    pub fn output_path(&self, input: &Path) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => {
                let stem = input
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("selection");
                input.with_file_name(format!("{stem}.square.ron"))
            }
        }
    }
}

/// Convert all holes of the selection at `input`
pub fn convert(input: &Path, options: &ConvertOptions) -> Result<BatchResult> {
    let config = options.resolve_config()?;
    let mut selection = Selection::load(input)
        .with_context(|| format!("Failed to load selection {}", input.display()))?;

    let kernel = default_kernel();
    tracing::info!(
        "Loaded {} bodies from {}",
        selection.bodies.len(),
        input.display()
    );

    let result = run_batch(kernel.as_ref(), config, &mut selection)?;

    let output = options.output_path(input);
    selection
        .save(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!("Wrote converted selection to {}", output.display());

    if let Some(path) = &options.json {
        let json = serde_json::to_string_pretty(&result)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(result)
}

fn run_batch(
    kernel: &dyn BrepKernel,
    config: ConversionConfig,
    selection: &mut Selection,
) -> Result<BatchResult> {
    let parallel = config.parallel;
    let orchestrator = BatchOrchestrator::new(kernel, config);
    Ok(dispatch(&orchestrator, &mut selection.bodies, parallel)?)
}

#[cfg(feature = "parallel")]
fn dispatch(
    orchestrator: &BatchOrchestrator<'_>,
    bodies: &mut [Body],
    parallel: bool,
) -> HoleResult<BatchResult> {
    if parallel {
        orchestrator.process_parallel(bodies, &NeverCancel, &mut TracingProgress)
    } else {
        orchestrator.process(bodies, &NeverCancel, &mut TracingProgress)
    }
}

#[cfg(not(feature = "parallel"))]
fn dispatch(
    orchestrator: &BatchOrchestrator<'_>,
    bodies: &mut [Body],
    parallel: bool,
) -> HoleResult<BatchResult> {
    if parallel {
        tracing::warn!("Built without the `parallel` feature, processing sequentially");
    }
    orchestrator.process(bodies, &NeverCancel, &mut TracingProgress)
}

/// Sample selection: a drilled plate, a block with a boss and a hole, and an
/// obliquely drilled cube
pub fn demo_selection() -> Result<Selection> {
    let mut plate = block("Plate", Vec3::new(0.0, 0.0, 5.0), Vec3::new(120.0, 80.0, 10.0))?;
    for (x, radius) in [(-40.0, 4.0), (0.0, 6.0), (40.0, 8.0)] {
        drill_hole(&mut plate, Vec3::new(x, 0.0, 0.0), Vec3::Z, radius)?;
    }

    let mut bracket = block("Bracket", Vec3::new(0.0, 0.0, 15.0), Vec3::splat(30.0))?;
    add_boss(&mut bracket, Vec3::new(0.0, 0.0, 30.0), Vec3::Z, 5.0, 12.0)?;
    drill_hole(&mut bracket, Vec3::new(0.0, 0.0, 15.0), Vec3::X, 3.0)?;

    let mut cube = block("Cube", Vec3::ZERO, Vec3::splat(50.0))?;
    drill_hole(&mut cube, Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0), 4.0)?;

    Ok(Selection::new(vec![plate, bracket, cube]))
}

pub fn write_demo(output: &Path) -> Result<()> {
    demo_selection()?
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))
}
