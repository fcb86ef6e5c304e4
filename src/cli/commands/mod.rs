//! CLI command implementations.

pub mod check;
pub mod criteria;
pub mod evaluate;
pub mod serve;

use anyhow::{Context, Result};

use crate::adapters::engines::EngineRegistry;
use crate::domain::models::Config;
use crate::services::{resolve_parameters, EvaluationPipeline, RubricResolution, SingleFlightGate};

/// Resolve the configured rubric and log the outcome once.
pub(crate) fn resolve_rubric(config: &Config) -> RubricResolution {
    let resolution = resolve_parameters(config.rubric.source());
    resolution.log();
    resolution
}

/// Build the evaluation pipeline for the configured engine.
pub(crate) fn build_pipeline(config: &Config) -> Result<EvaluationPipeline> {
    let engine = EngineRegistry::create(&config.engine).with_context(|| {
        format!("Failed to create {} analysis engine", config.engine.kind.as_str())
    })?;

    let pipeline = EvaluationPipeline::new(engine, SingleFlightGate::global());
    Ok(match &config.workdir {
        Some(dir) => pipeline.with_workdir(dir),
        None => pipeline,
    })
}
