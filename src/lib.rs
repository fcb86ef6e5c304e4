//! HackEval - hackathon submission evaluation service
//!
//! Accepts uploaded submissions (slide decks, documents), hands each one to
//! an analysis engine one at a time, and aggregates the per-criterion scores
//! against a configurable rubric.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): rubric, analysis and result models, errors,
//!   and the `AnalysisEngine` port
//! - **Service Layer** (`services`): single-flight gate, rubric resolution and
//!   the evaluation pipeline
//! - **Adapters** (`adapters`): analysis engines and the HTTP API
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use hackeval::adapters::engines::MockAnalysisEngine;
//! use hackeval::services::{EvaluationPipeline, SingleFlightGate};
//! use hackeval::{EvaluationParameters, SubmittedArtifact};
//! use std::sync::Arc;
//!
//! let pipeline = EvaluationPipeline::new(Arc::new(MockAnalysisEngine::new()), SingleFlightGate::global());
//! let result = pipeline
//!     .evaluate(
//!         SubmittedArtifact::new("deck.pdf", bytes),
//!         "combined",
//!         Arc::new(EvaluationParameters::standard()),
//!     )
//!     .await?;
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AnalysisContext, Config, CriteriaOverview, Criterion, EngineConfig, EngineKind,
    EvaluationParameters, EvaluationResult, LoggingConfig, ServerConfig, SubmittedArtifact,
};
pub use domain::ports::AnalysisEngine;
pub use domain::{ConfigurationError, EngineError, EvaluationError};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{EvaluationPipeline, RubricResolution, SingleFlightGate};
