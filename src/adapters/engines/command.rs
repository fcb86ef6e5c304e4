//! Command-line analysis engine.
//!
//! Spawns the configured analysis program once per evaluation. The program
//! receives `--file <path> --mode <mode>` after its configured arguments, the
//! rubric as JSON on stdin, and must print an analysis context as JSON on
//! stdout. Anything it logs before the final JSON line is ignored.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdin, Command};
use tracing::debug;

use crate::domain::errors::EngineError;
use crate::domain::models::{AnalysisContext, EngineConfig, EvaluationParameters};
use crate::domain::ports::AnalysisEngine;
use crate::services::single_flight::GatePermit;

/// Command engine configuration.
#[derive(Debug, Clone)]
pub struct CommandEngineConfig {
    /// Program to execute
    pub program: String,
    /// Arguments placed before `--file` and `--mode`
    pub args: Vec<String>,
    /// Upper bound for one analysis; the child is killed when exceeded
    pub timeout: Duration,
}

impl Default for CommandEngineConfig {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for CommandEngineConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            program: config.command.clone(),
            args: config.args.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Analysis engine backed by a local program.
pub struct CommandAnalysisEngine {
    config: CommandEngineConfig,
}

impl CommandAnalysisEngine {
    pub const fn new(config: CommandEngineConfig) -> Self {
        Self { config }
    }

    /// Build CLI arguments for one analysis.
    fn build_args(&self, file_path: &Path, mode: &str) -> Vec<String> {
        let mut args = self.config.args.clone();
        args.push("--file".to_string());
        args.push(file_path.display().to_string());
        args.push("--mode".to_string());
        args.push(mode.to_string());
        args
    }

    /// Parse the program's stdout.
    ///
    /// Accepts either a document that is entirely JSON or log output whose
    /// last non-empty line is the JSON result.
    fn parse_output(stdout: &[u8]) -> Result<AnalysisContext, EngineError> {
        let text = String::from_utf8_lossy(stdout);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(EngineError::MalformedOutput(
                "analysis program produced no output".to_string(),
            ));
        }

        serde_json::from_str(trimmed).or_else(|whole_err| {
            let last_line = trimmed
                .lines()
                .rev()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .unwrap_or_default();
            serde_json::from_str(last_line)
                .map_err(|_| EngineError::MalformedOutput(whole_err.to_string()))
        })
    }
}

/// Write the rubric to the program's stdin and close it.
///
/// A program that exits or closes stdin without reading the rubric is not an
/// error; its exit status and stdout decide the outcome.
async fn send_rubric(stdin: Option<ChildStdin>, rubric: &[u8]) -> Result<(), EngineError> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };

    match stdin.write_all(rubric).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("analysis program closed stdin before reading the rubric");
            Ok(())
        }
        Err(e) => Err(EngineError::Failed(format!("failed to send rubric: {e}"))),
    }
}

#[async_trait]
impl AnalysisEngine for CommandAnalysisEngine {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn is_available(&self) -> bool {
        let output = Command::new(&self.config.program)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        matches!(output, Ok(out) if out.status.success())
    }

    async fn process(
        &self,
        file_path: &Path,
        mode: &str,
        permit: &GatePermit,
        params: &EvaluationParameters,
    ) -> Result<AnalysisContext, EngineError> {
        let args = self.build_args(file_path, mode);
        debug!(
            program = %self.config.program,
            ?args,
            scope = permit.scope(),
            "spawning analysis program"
        );

        let mut child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                EngineError::Unavailable(format!(
                    "failed to spawn {}: {e}",
                    self.config.program
                ))
            })?;

        let rubric = serde_json::to_vec(params)
            .map_err(|e| EngineError::Failed(format!("failed to encode rubric: {e}")))?;
        let stdin = child.stdin.take();

        // The rubric is written while stdout is drained so neither pipe can
        // fill up and stall the program.
        let exchange = async move {
            let (sent, output) =
                tokio::join!(send_rubric(stdin, &rubric), child.wait_with_output());
            sent?;
            output.map_err(|e| {
                EngineError::Failed(format!("failed to wait for analysis program: {e}"))
            })
        };

        let output = tokio::time::timeout(self.config.timeout, exchange)
            .await
            .map_err(|_| EngineError::Timeout(self.config.timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EngineError::Failed(format!(
                "{} exited with {}: {}",
                self.config.program,
                output.status,
                stderr.trim()
            )));
        }

        Self::parse_output(&output.stdout)
    }
}
