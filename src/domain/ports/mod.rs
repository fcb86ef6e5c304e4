//! Port trait definitions (Hexagonal Architecture)
//!
//! - AnalysisEngine: inspects a submitted artifact and scores it against a rubric

pub mod analysis_engine;

pub use analysis_engine::AnalysisEngine;
