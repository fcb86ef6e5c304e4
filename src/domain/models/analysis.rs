//! Analysis context produced by the analysis engine for one submission.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Per-criterion scores and feedback for one evaluated submission.
///
/// Created fresh by the analysis engine for every request and owned by the
/// pipeline call that requested it. Keys are expected to match rubric
/// criteria but nothing fails when they do not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisContext {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub scores: BTreeMap<String, i64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub feedback: BTreeMap<String, String>,
    #[serde(default)]
    pub team_name: Option<String>,
}

/// Engines may emit `null` for a map they never filled in.
fn null_as_empty<'de, D, V>(deserializer: D) -> Result<BTreeMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    Ok(Option::<BTreeMap<String, V>>::deserialize(deserializer)?.unwrap_or_default())
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(mut self, criterion: impl Into<String>, score: i64) -> Self {
        self.scores.insert(criterion.into(), score);
        self
    }

    pub fn with_feedback(mut self, criterion: impl Into<String>, text: impl Into<String>) -> Self {
        self.feedback.insert(criterion.into(), text.into());
        self
    }

    pub fn with_team_name(mut self, name: impl Into<String>) -> Self {
        self.team_name = Some(name.into());
        self
    }

    /// Sum of all awarded scores; 0 when nothing was scored.
    ///
    /// `None` when the sum does not fit in an `i64`.
    pub fn total_score(&self) -> Option<i64> {
        self.scores
            .values()
            .try_fold(0i64, |total, score| total.checked_add(*score))
    }

    /// The team name if the engine found a non-blank one.
    pub fn display_name(&self) -> Option<&str> {
        self.team_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}
