//! Rubric domain model.
//!
//! A rubric is a set of named, weighted, capped criteria plus free-text
//! guidance handed to the analysis engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::errors::ConfigurationError;

/// A single scoring dimension within a rubric.
///
/// The criterion name is the key it is stored under in
/// [`EvaluationParameters::criteria`], so it is not repeated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    /// Descriptive weight. Weights are not required to sum to 1.
    pub weight: f64,
    /// Highest score the analysis engine is expected to award.
    pub max_score: u32,
}

impl Criterion {
    pub const fn new(weight: f64, max_score: u32) -> Self {
        Self { weight, max_score }
    }
}

/// The full rubric used to grade a submission.
///
/// Immutable once loaded; share it behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationParameters {
    /// Criteria keyed by name.
    pub criteria: BTreeMap<String, Criterion>,
    /// Free-text grading guidance.
    #[serde(default)]
    pub rubric: String,
}

impl EvaluationParameters {
    pub fn new(criteria: BTreeMap<String, Criterion>, rubric: impl Into<String>) -> Self {
        Self {
            criteria,
            rubric: rubric.into(),
        }
    }

    /// Built-in rubric used when no rubric source is configured.
    pub fn standard() -> Self {
        let criteria = [
            ("Innovation", Criterion::new(0.3, 30)),
            ("Technical Implementation", Criterion::new(0.3, 30)),
            ("Presentation Quality", Criterion::new(0.2, 20)),
            ("Impact", Criterion::new(0.2, 20)),
        ]
        .into_iter()
        .map(|(name, criterion)| (name.to_string(), criterion))
        .collect();

        Self::new(
            criteria,
            "Evaluate based on innovation, technical quality, presentation, and potential impact.",
        )
    }

    /// Built-in rubric substituted when a configured rubric source is broken.
    pub fn fallback() -> Self {
        let mut criteria = BTreeMap::new();
        criteria.insert("Overall".to_string(), Criterion::new(1.0, 100));
        Self::new(criteria, "General evaluation")
    }

    /// Sum of every criterion's `max_score`.
    pub fn max_possible(&self) -> u64 {
        self.criteria.values().map(|c| u64::from(c.max_score)).sum()
    }

    /// Whether `name` is one of this rubric's criteria.
    pub fn has_criterion(&self, name: &str) -> bool {
        self.criteria.contains_key(name)
    }

    /// Check the structural invariants every usable rubric must satisfy.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.criteria.is_empty() {
            return Err(ConfigurationError::Invalid(
                "rubric must define at least one criterion".to_string(),
            ));
        }

        for (name, criterion) in &self.criteria {
            if name.trim().is_empty() {
                return Err(ConfigurationError::Invalid(
                    "criterion names cannot be blank".to_string(),
                ));
            }
            if !criterion.weight.is_finite() || criterion.weight < 0.0 {
                return Err(ConfigurationError::Invalid(format!(
                    "criterion '{name}' has invalid weight {}",
                    criterion.weight
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_rubric_is_valid() {
        let params = EvaluationParameters::standard();
        assert!(params.validate().is_ok());
        assert_eq!(params.criteria.len(), 4);
        assert_eq!(params.max_possible(), 100);
        assert!(params.has_criterion("Technical Implementation"));
    }

    #[test]
    fn test_fallback_rubric_is_valid() {
        let params = EvaluationParameters::fallback();
        assert!(params.validate().is_ok());
        assert_eq!(params.max_possible(), 100);
        assert_eq!(params.rubric, "General evaluation");
    }

    #[test]
    fn test_weights_are_not_normalized() {
        let mut criteria = BTreeMap::new();
        criteria.insert("A".to_string(), Criterion::new(3.0, 10));
        criteria.insert("B".to_string(), Criterion::new(5.0, 15));
        let params = EvaluationParameters::new(criteria, "");

        assert!(params.validate().is_ok());
        assert_eq!(params.max_possible(), 25);
        assert!((params.criteria["A"].weight - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_rejects_empty_criteria() {
        let params = EvaluationParameters::new(BTreeMap::new(), "nothing");
        assert!(matches!(
            params.validate(),
            Err(ConfigurationError::Invalid(_))
        ));
    }

    #[test]
    fn test_validate_rejects_negative_weight() {
        let mut criteria = BTreeMap::new();
        criteria.insert("Innovation".to_string(), Criterion::new(-0.5, 10));
        let params = EvaluationParameters::new(criteria, "");
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_deserialize_without_rubric_text() {
        let json = r#"{"criteria": {"Impact": {"weight": 0.2, "max_score": 20}}}"#;
        let params: EvaluationParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.rubric, "");
        assert_eq!(params.criteria["Impact"].max_score, 20);
    }

    #[test]
    fn test_negative_max_score_is_rejected_by_parsing() {
        let json = r#"{"criteria": {"Impact": {"weight": 0.2, "max_score": -5}}}"#;
        assert!(serde_json::from_str::<EvaluationParameters>(json).is_err());
    }
}
