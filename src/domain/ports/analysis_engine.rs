//! Analysis engine port - interface for the external document analyzer.

use async_trait::async_trait;
use std::path::Path;

use crate::domain::errors::EngineError;
use crate::domain::models::{AnalysisContext, EvaluationParameters};
use crate::services::single_flight::GatePermit;

/// Trait for analysis engine implementations.
///
/// An engine inspects one materialized submission and scores it against a
/// rubric. Implementations may dispatch on the file extension of
/// `file_path`. The engine is a black box to the pipeline: it either returns
/// a populated [`AnalysisContext`] or fails.
#[async_trait]
pub trait AnalysisEngine: Send + Sync {
    /// Get the engine type name.
    fn name(&self) -> &'static str;

    /// Check if the engine is reachable and properly configured.
    async fn is_available(&self) -> bool;

    /// Analyze the file at `file_path`.
    ///
    /// `permit` proves the caller holds the single-flight gate for the
    /// duration of the call. Engines must not try to acquire the gate again.
    async fn process(
        &self,
        file_path: &Path,
        mode: &str,
        permit: &GatePermit,
        params: &EvaluationParameters,
    ) -> Result<AnalysisContext, EngineError>;
}
