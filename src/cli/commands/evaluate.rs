//! Implementation of the `hackeval evaluate` command.

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::Cell;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::commands::{build_pipeline, resolve_rubric};
use crate::cli::output::{list_table, number_cell, output, CommandOutput};
use crate::domain::models::{Config, EvaluationResult, SubmittedArtifact, DEFAULT_AGENT_MODE};

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Submission file (pdf, pptx, docx, ...)
    pub file: PathBuf,

    /// Analysis mode handed to the engine
    #[arg(short, long, default_value = DEFAULT_AGENT_MODE)]
    pub mode: String,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct EvaluateOutput {
    pub result: EvaluationResult,
}

impl CommandOutput for EvaluateOutput {
    fn to_human(&self) -> String {
        let result = &self.result;
        let mut table = list_table(&["criterion", "score", "feedback"]);
        for (name, score) in &result.scores_breakdown {
            let feedback = result.feedback.get(name).map_or("", String::as_str);
            table.add_row(vec![Cell::new(name), number_cell(score), Cell::new(feedback)]);
        }

        // Feedback for criteria the engine did not score.
        for (name, feedback) in &result.feedback {
            if !result.scores_breakdown.contains_key(name) {
                table.add_row(vec![Cell::new(name), number_cell("-"), Cell::new(feedback)]);
            }
        }

        format!(
            "{}\nTeam: {}\nScore: {}/{}\n\n{}",
            result.message, result.team_name, result.score, result.total_score, table
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.result).unwrap_or_default()
    }
}

pub async fn execute(args: EvaluateArgs, config: Config, json_mode: bool) -> Result<()> {
    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let filename = args
        .file
        .file_name()
        .map_or_else(|| args.file.display().to_string(), |n| n.to_string_lossy().into_owned());

    let params = Arc::new(resolve_rubric(&config).into_params());
    let pipeline = build_pipeline(&config)?;

    let result = pipeline
        .evaluate(SubmittedArtifact::new(filename, bytes), &args.mode, params)
        .await
        .with_context(|| format!("Evaluation of {} failed", args.file.display()))?;

    output(&EvaluateOutput { result }, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::EngineKind;
    use std::collections::BTreeMap;

    fn sample_result() -> EvaluationResult {
        EvaluationResult {
            success: true,
            score: 41,
            total_score: 100,
            feedback: BTreeMap::from([
                ("Impact".to_string(), "Clear audience".to_string()),
                ("Innovation".to_string(), "Not scored".to_string()),
            ]),
            scores_breakdown: BTreeMap::from([("Impact".to_string(), 41)]),
            team_name: "Rustaceans".to_string(),
            message: "Evaluation completed successfully".to_string(),
        }
    }

    #[test]
    fn test_human_output() {
        let human = EvaluateOutput {
            result: sample_result(),
        }
        .to_human();
        assert!(human.contains("Team: Rustaceans"));
        assert!(human.contains("Score: 41/100"));
        assert!(human.contains("Clear audience"));
        assert!(human.contains("Not scored"));
    }

    #[test]
    fn test_json_output_is_the_result() {
        let json = EvaluateOutput {
            result: sample_result(),
        }
        .to_json();
        assert_eq!(json["score"], 41);
        assert_eq!(json["total_score"], 100);
        assert_eq!(json["scores_breakdown"]["Impact"], 41);
    }

    #[tokio::test]
    async fn test_missing_file_is_reported() {
        let mut config = Config::default();
        config.engine.kind = EngineKind::Mock;
        let args = EvaluateArgs {
            file: PathBuf::from("/no/such/submission.pdf"),
            mode: DEFAULT_AGENT_MODE.to_string(),
        };

        let err = execute(args, config, true).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
