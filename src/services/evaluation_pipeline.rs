//! Evaluation pipeline.
//!
//! Orchestrates one evaluation: materialize the upload to a transient file,
//! take the single-flight gate, run the analysis engine, aggregate its scores
//! against the rubric and delete the transient file.
//!
//! Once the gate is held, the engine call, gate release and cleanup run on a
//! detached task. A caller that goes away mid-analysis therefore cannot leak
//! the gate or the file, while a caller cancelled in the queue simply leaves
//! it.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::domain::errors::{CleanupWarning, EngineError, EvaluationError};
use crate::domain::models::{
    AnalysisContext, CriteriaOverview, EvaluationParameters, EvaluationResult, SubmittedArtifact,
};
use crate::domain::ports::AnalysisEngine;
use crate::services::single_flight::SingleFlightGate;

const TRANSIENT_PREFIX: &str = "hackeval-";

/// Evaluation pipeline service.
pub struct EvaluationPipeline {
    engine: Arc<dyn AnalysisEngine>,
    gate: SingleFlightGate,
    workdir: Option<PathBuf>,
}

impl EvaluationPipeline {
    /// Create a pipeline that serializes engine calls through `gate`.
    pub fn new(engine: Arc<dyn AnalysisEngine>, gate: SingleFlightGate) -> Self {
        Self {
            engine,
            gate,
            workdir: None,
        }
    }

    /// Place transient files in `dir` instead of the system temp directory.
    #[must_use]
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    pub const fn gate(&self) -> &SingleFlightGate {
        &self.gate
    }

    pub fn engine(&self) -> &Arc<dyn AnalysisEngine> {
        &self.engine
    }

    /// Evaluate one submission against `params`.
    pub async fn evaluate(
        &self,
        artifact: SubmittedArtifact,
        mode: &str,
        params: Arc<EvaluationParameters>,
    ) -> Result<EvaluationResult, EvaluationError> {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "evaluation",
            %request_id,
            filename = %artifact.filename,
            mode = %mode,
            engine = self.engine.name(),
        );

        async move {
            let result = self.run(artifact, mode, params).await;
            match &result {
                Ok(evaluation) => info!(
                    score = evaluation.score,
                    total_score = evaluation.total_score,
                    team_name = %evaluation.team_name,
                    "evaluation completed"
                ),
                Err(err) => error!(code = err.code(), error = ?err, "evaluation failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        artifact: SubmittedArtifact,
        mode: &str,
        params: Arc<EvaluationParameters>,
    ) -> Result<EvaluationResult, EvaluationError> {
        let transient = self.materialize(&artifact).map_err(EvaluationError::Intake)?;
        debug!(
            path = %transient.path().display(),
            bytes = artifact.bytes.len(),
            "artifact materialized"
        );

        // Dropping `transient` while queued removes the file.
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;

        let engine = Arc::clone(&self.engine);
        let mode = mode.to_string();
        let filename = artifact.filename;

        let analysis = tokio::spawn(
            async move {
                let outcome = engine
                    .process(transient.path(), &mode, &permit, &params)
                    .await;
                remove_transient(transient);
                drop(permit);

                outcome.and_then(|context| {
                    audit_scores(&context, &params);
                    EvaluationResult::aggregate(context, &params, &filename)
                })
            }
            .in_current_span(),
        );

        match analysis.await {
            Ok(outcome) => outcome.map_err(EvaluationError::from),
            Err(join_err) => Err(EngineError::Failed(format!(
                "analysis task aborted: {join_err}"
            ))
            .into()),
        }
    }

    /// Write the upload to a transient file carrying the original extension.
    fn materialize(&self, artifact: &SubmittedArtifact) -> std::io::Result<NamedTempFile> {
        let suffix = artifact.suffix();
        let mut builder = tempfile::Builder::new();
        builder.prefix(TRANSIENT_PREFIX).suffix(&suffix);

        let mut file = match &self.workdir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(&artifact.bytes)?;
        file.flush()?;
        Ok(file)
    }
}

/// Read-only view of the rubric currently in use.
pub fn criteria_overview(params: &EvaluationParameters) -> CriteriaOverview {
    CriteriaOverview::from(params)
}

/// Delete the transient file. Failures are logged and swallowed.
fn remove_transient(file: NamedTempFile) {
    let path = file.path().to_path_buf();
    if let Err(source) = file.close() {
        let warning = CleanupWarning { path, source };
        warn!(error = %warning, "transient artifact cleanup failed");
    }
}

/// Log scores the rubric cannot account for. Values are never altered.
fn audit_scores(context: &AnalysisContext, params: &EvaluationParameters) {
    for (name, score) in &context.scores {
        match params.criteria.get(name) {
            None => warn!(criterion = %name, score, "engine scored an unknown criterion"),
            Some(criterion) if *score < 0 || *score > i64::from(criterion.max_score) => warn!(
                criterion = %name,
                score,
                max_score = criterion.max_score,
                "engine score outside criterion range"
            ),
            Some(_) => {}
        }
    }

    for name in params.criteria.keys() {
        if !context.scores.contains_key(name) {
            debug!(criterion = %name, "engine returned no score for criterion");
        }
    }
}
