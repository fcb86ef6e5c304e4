//! Rubric resolution.
//!
//! Turns an optional rubric source into the [`EvaluationParameters`] used for
//! the lifetime of the process. Resolution never fails: a broken source is
//! replaced by a built-in rubric and the outcome says which one was used.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::domain::errors::ConfigurationError;
use crate::domain::models::EvaluationParameters;

/// Outcome of resolving the rubric source.
#[derive(Debug)]
pub enum RubricResolution {
    /// The configured source was read and validated.
    Loaded {
        params: EvaluationParameters,
        source: PathBuf,
    },
    /// A built-in rubric is in use. `reason` is set when a configured source
    /// could not be used.
    Defaulted {
        params: EvaluationParameters,
        reason: Option<ConfigurationError>,
    },
}

impl RubricResolution {
    pub fn params(&self) -> &EvaluationParameters {
        match self {
            Self::Loaded { params, .. } | Self::Defaulted { params, .. } => params,
        }
    }

    pub fn into_params(self) -> EvaluationParameters {
        match self {
            Self::Loaded { params, .. } | Self::Defaulted { params, .. } => params,
        }
    }

    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    /// Emit the single startup log line describing the outcome.
    pub fn log(&self) {
        match self {
            Self::Loaded { params, source } => info!(
                source = %source.display(),
                criteria = params.criteria.len(),
                total_score = params.max_possible(),
                "rubric loaded"
            ),
            Self::Defaulted {
                params,
                reason: None,
            } => info!(
                criteria = params.criteria.len(),
                total_score = params.max_possible(),
                "no rubric source configured, using built-in rubric"
            ),
            Self::Defaulted {
                params,
                reason: Some(reason),
            } => warn!(
                error = %reason,
                criteria = params.criteria.len(),
                total_score = params.max_possible(),
                "rubric source unusable, using built-in rubric"
            ),
        }
    }
}

/// Resolve the rubric from an optional source path.
///
/// - no source: the standard rubric
/// - a source that does not exist: the standard rubric
/// - a source that cannot be read, parsed or validated: the fallback rubric
pub fn resolve_parameters(source: Option<&Path>) -> RubricResolution {
    let Some(path) = source else {
        return RubricResolution::Defaulted {
            params: EvaluationParameters::standard(),
            reason: None,
        };
    };

    match load_parameters(path) {
        Ok(params) => RubricResolution::Loaded {
            params,
            source: path.to_path_buf(),
        },
        Err(reason @ ConfigurationError::NotFound(_)) => RubricResolution::Defaulted {
            params: EvaluationParameters::standard(),
            reason: Some(reason),
        },
        Err(reason) => RubricResolution::Defaulted {
            params: EvaluationParameters::fallback(),
            reason: Some(reason),
        },
    }
}

/// Read and validate a rubric file. JSON when the extension is `.json`,
/// YAML otherwise.
pub fn load_parameters(path: &Path) -> Result<EvaluationParameters, ConfigurationError> {
    if !path.exists() {
        return Err(ConfigurationError::NotFound(path.to_path_buf()));
    }

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let params: EvaluationParameters = if is_json {
        serde_json::from_str(&raw).map_err(|e| ConfigurationError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
    } else {
        serde_yaml::from_str(&raw).map_err(|e| ConfigurationError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
    };

    params.validate()?;
    Ok(params)
}
