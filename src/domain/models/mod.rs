//! Domain models for rubric evaluation.

pub mod analysis;
pub mod config;
pub mod evaluation;
pub mod rubric;

pub use analysis::AnalysisContext;
pub use config::{Config, EngineConfig, EngineKind, LoggingConfig, RubricConfig, ServerConfig};
pub use evaluation::{
    CriteriaOverview, EvaluationResult, SubmittedArtifact, DEFAULT_AGENT_MODE, SUCCESS_MESSAGE,
};
pub use rubric::{Criterion, EvaluationParameters};
