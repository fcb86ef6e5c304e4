//! Implementation of the `hackeval criteria` command.

use anyhow::Result;
use comfy_table::Cell;
use serde::Serialize;

use crate::cli::commands::resolve_rubric;
use crate::cli::output::{list_table, number_cell, output, CommandOutput};
use crate::domain::models::{Config, CriteriaOverview};
use crate::services::{criteria_overview, RubricResolution};

#[derive(Debug, Serialize)]
pub struct CriteriaOutput {
    /// Where the rubric came from: a file path or "built-in".
    pub source: String,
    #[serde(flatten)]
    pub overview: CriteriaOverview,
}

impl CriteriaOutput {
    pub fn from_resolution(resolution: &RubricResolution) -> Self {
        let source = match resolution {
            RubricResolution::Loaded { source, .. } => source.display().to_string(),
            RubricResolution::Defaulted { .. } => "built-in".to_string(),
        };
        Self {
            source,
            overview: criteria_overview(resolution.params()),
        }
    }
}

impl CommandOutput for CriteriaOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["criterion", "weight", "max score"]);
        for (name, criterion) in &self.overview.criteria {
            table.add_row(vec![
                Cell::new(name),
                number_cell(format!("{:.2}", criterion.weight)),
                number_cell(criterion.max_score),
            ]);
        }

        let mut lines = vec![
            format!("Rubric source: {}", self.source),
            String::new(),
            table.to_string(),
            String::new(),
            format!("Total possible score: {}", self.overview.total_score),
        ];
        if !self.overview.rubric.trim().is_empty() {
            lines.push(String::new());
            lines.push(self.overview.rubric.trim().to_string());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(config: Config, json_mode: bool) -> Result<()> {
    let resolution = resolve_rubric(&config);
    output(&CriteriaOutput::from_resolution(&resolution), json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::EvaluationParameters;
    use std::path::PathBuf;

    #[test]
    fn test_builtin_rubric_output() {
        let resolution = RubricResolution::Defaulted {
            params: EvaluationParameters::standard(),
            reason: None,
        };
        let out = CriteriaOutput::from_resolution(&resolution);

        assert_eq!(out.source, "built-in");
        let human = out.to_human();
        assert!(human.contains("Technical Implementation"));
        assert!(human.contains("Total possible score: 100"));

        let json = out.to_json();
        assert_eq!(json["total_score"], 100);
        assert_eq!(json["criteria"]["Innovation"]["max_score"], 30);
    }

    #[test]
    fn test_loaded_rubric_reports_source() {
        let resolution = RubricResolution::Loaded {
            params: EvaluationParameters::fallback(),
            source: PathBuf::from("/srv/rubric.json"),
        };
        let out = CriteriaOutput::from_resolution(&resolution);
        assert_eq!(out.source, "/srv/rubric.json");
        assert_eq!(out.overview.total_score, 100);
    }
}
