//! Domain layer for the evaluation service
//!
//! Pure data models, error types and the port the analysis engine adapters
//! implement. Nothing in here performs I/O.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{CleanupWarning, ConfigurationError, EngineError, EvaluationError};
