//! Evaluation request and result models.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::errors::EngineError;

use super::analysis::AnalysisContext;
use super::rubric::{Criterion, EvaluationParameters};

/// Mode passed to the analysis engine when the caller does not choose one.
pub const DEFAULT_AGENT_MODE: &str = "combined";

/// Message attached to every successful evaluation.
pub const SUCCESS_MESSAGE: &str = "Evaluation completed successfully";

/// An uploaded submission.
#[derive(Debug, Clone)]
pub struct SubmittedArtifact {
    /// Caller-supplied name. Only used for the extension hint and as a
    /// fallback display name.
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl SubmittedArtifact {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// File extension including the leading dot, or an empty string.
    pub fn suffix(&self) -> String {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default()
    }
}

/// Caller-facing evaluation result.
///
/// `score` is the achieved total and `total_score` the achievable maximum.
/// Callers depend on these literal field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub success: bool,
    pub score: i64,
    pub total_score: u64,
    pub feedback: BTreeMap<String, String>,
    pub scores_breakdown: BTreeMap<String, i64>,
    pub team_name: String,
    pub message: String,
}

impl EvaluationResult {
    /// Aggregate an engine's output against the rubric it was scored with.
    ///
    /// The achieved and achievable totals are computed independently; an
    /// over-range total is reported as-is. Scores whose sum overflows are
    /// rejected as malformed engine output.
    pub fn aggregate(
        context: AnalysisContext,
        params: &EvaluationParameters,
        filename: &str,
    ) -> Result<Self, EngineError> {
        let score = context.total_score().ok_or_else(|| {
            EngineError::MalformedOutput("sum of scores overflows a 64-bit integer".to_string())
        })?;
        let total_score = params.max_possible();
        let team_name = context
            .display_name()
            .map_or_else(|| filename.to_string(), str::to_string);

        Ok(Self {
            success: true,
            score,
            total_score,
            feedback: context.feedback,
            scores_breakdown: context.scores,
            team_name,
            message: SUCCESS_MESSAGE.to_string(),
        })
    }
}

/// Read-only view of the loaded rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaOverview {
    pub criteria: BTreeMap<String, Criterion>,
    pub rubric: String,
    pub total_score: u64,
}

impl From<&EvaluationParameters> for CriteriaOverview {
    fn from(params: &EvaluationParameters) -> Self {
        Self {
            criteria: params.criteria.clone(),
            rubric: params.rubric.clone(),
            total_score: params.max_possible(),
        }
    }
}
