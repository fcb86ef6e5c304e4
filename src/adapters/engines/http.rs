//! HTTP analysis engine.
//!
//! Delegates analysis to a co-located service that can read the transient
//! artifact directory. The request carries the file path, mode and rubric;
//! the response body is the analysis context.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::domain::errors::EngineError;
use crate::domain::models::{AnalysisContext, EvaluationParameters};
use crate::domain::ports::AnalysisEngine;
use crate::services::single_flight::GatePermit;

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    file_path: String,
    mode: &'a str,
    params: &'a EvaluationParameters,
}

/// Analysis engine backed by a remote HTTP endpoint.
pub struct HttpAnalysisEngine {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpAnalysisEngine {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AnalysisEngine for HttpAnalysisEngine {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn is_available(&self) -> bool {
        // Any HTTP answer means the service is reachable.
        self.client.get(&self.url).send().await.is_ok()
    }

    async fn process(
        &self,
        file_path: &Path,
        mode: &str,
        permit: &GatePermit,
        params: &EvaluationParameters,
    ) -> Result<AnalysisContext, EngineError> {
        debug!(url = %self.url, scope = permit.scope(), "requesting remote analysis");

        let request = AnalyzeRequest {
            file_path: file_path.display().to_string(),
            mode,
            params,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EngineError::Timeout(self.timeout)
                } else {
                    EngineError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EngineError::Failed(format!(
                "analysis service returned {status}: {}",
                body.trim()
            )));
        }

        response
            .json::<AnalysisContext>()
            .await
            .map_err(|e| EngineError::MalformedOutput(e.to_string()))
    }
}
