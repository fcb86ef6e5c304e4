//! Analysis engine registry and factory.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::EngineError;
use crate::domain::models::{EngineConfig, EngineKind};
use crate::domain::ports::AnalysisEngine;

use super::command::{CommandAnalysisEngine, CommandEngineConfig};
use super::http::HttpAnalysisEngine;
use super::mock::MockAnalysisEngine;

/// Builds the analysis engine selected by configuration.
pub struct EngineRegistry;

impl EngineRegistry {
    /// Create the engine described by `config`.
    pub fn create(config: &EngineConfig) -> Result<Arc<dyn AnalysisEngine>, EngineError> {
        match config.kind {
            EngineKind::Command => Ok(Arc::new(CommandAnalysisEngine::new(
                CommandEngineConfig::from(config),
            ))),
            EngineKind::Http => {
                let url = config.url.as_deref().ok_or_else(|| {
                    EngineError::Unavailable("http engine requires engine.url".to_string())
                })?;
                let engine =
                    HttpAnalysisEngine::new(url, Duration::from_secs(config.timeout_secs))?;
                Ok(Arc::new(engine))
            }
            EngineKind::Mock => Ok(Arc::new(MockAnalysisEngine::new())),
        }
    }
}
