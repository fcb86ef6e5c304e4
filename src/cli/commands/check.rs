//! Implementation of the `hackeval check` command.
//!
//! Deployment self-test: configuration, rubric resolution, transient
//! storage and analysis engine availability.

use anyhow::{bail, Result};
use serde::Serialize;
use std::path::Path;

use crate::adapters::engines::EngineRegistry;
use crate::cli::commands::resolve_rubric;
use crate::cli::output::{output, CommandOutput};
use crate::domain::errors::ConfigurationError;
use crate::domain::models::Config;
use crate::services::RubricResolution;

#[derive(Debug, Clone, Serialize)]
pub struct CheckItem {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl CheckItem {
    fn pass(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(name: &str, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckOutput {
    pub healthy: bool,
    pub checks: Vec<CheckItem>,
}

impl CheckOutput {
    pub fn new(checks: Vec<CheckItem>) -> Self {
        Self {
            healthy: checks.iter().all(|c| c.passed),
            checks,
        }
    }
}

impl CommandOutput for CheckOutput {
    fn to_human(&self) -> String {
        let mut lines: Vec<String> = self
            .checks
            .iter()
            .map(|c| {
                let mark = if c.passed { "ok" } else { "FAIL" };
                format!("[{mark:>4}] {}: {}", c.name, c.detail)
            })
            .collect();
        lines.push(String::new());
        lines.push(if self.healthy {
            "All checks passed.".to_string()
        } else {
            "Some checks failed.".to_string()
        });
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(config: Config, json_mode: bool) -> Result<()> {
    let report = CheckOutput::new(run_checks(&config).await);
    output(&report, json_mode);

    if !report.healthy {
        bail!("{} check(s) failed", report.checks.iter().filter(|c| !c.passed).count());
    }
    Ok(())
}

/// Run every check. Configuration has already been loaded and validated.
pub async fn run_checks(config: &Config) -> Vec<CheckItem> {
    vec![
        CheckItem::pass(
            "configuration",
            format!(
                "engine={} listen={}:{}",
                config.engine.kind.as_str(),
                config.server.host,
                config.server.port
            ),
        ),
        check_rubric(&resolve_rubric(config)),
        check_workdir(config.workdir.as_deref()),
        check_engine(config).await,
    ]
}

fn check_rubric(resolution: &RubricResolution) -> CheckItem {
    let total = resolution.params().max_possible();
    match resolution {
        RubricResolution::Loaded { source, params } => CheckItem::pass(
            "rubric",
            format!(
                "{} criteria from {} (total {total})",
                params.criteria.len(),
                source.display()
            ),
        ),
        RubricResolution::Defaulted { reason: None, .. } => {
            CheckItem::pass("rubric", format!("built-in rubric (total {total})"))
        }
        RubricResolution::Defaulted {
            reason: Some(reason),
            ..
        } => {
            let served = match reason {
                ConfigurationError::NotFound(_) => "standard",
                _ => "fallback",
            };
            CheckItem::fail(
                "rubric",
                format!("{reason}; serving {served} rubric (total {total})"),
            )
        }
    }
}

fn check_workdir(workdir: Option<&Path>) -> CheckItem {
    let probe = match workdir {
        Some(dir) => tempfile::tempfile_in(dir),
        None => tempfile::tempfile(),
    };
    let location = workdir.map_or_else(
        || std::env::temp_dir().display().to_string(),
        |dir| dir.display().to_string(),
    );

    match probe {
        Ok(_) => CheckItem::pass("workdir", format!("{location} is writable")),
        Err(e) => CheckItem::fail("workdir", format!("{location}: {e}")),
    }
}

async fn check_engine(config: &Config) -> CheckItem {
    let kind = config.engine.kind.as_str();
    match EngineRegistry::create(&config.engine) {
        Ok(engine) if engine.is_available().await => {
            CheckItem::pass("engine", format!("{kind} engine is available"))
        }
        Ok(_) => CheckItem::fail("engine", format!("{kind} engine is not reachable")),
        Err(e) => CheckItem::fail("engine", e.to_string()),
    }
}
