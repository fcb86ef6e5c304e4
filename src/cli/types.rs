//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::evaluate::EvaluateArgs;
use crate::cli::commands::serve::ServeArgs;

#[derive(Parser, Debug)]
#[command(name = "hackeval")]
#[command(about = "HackEval - hackathon submission evaluation service", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file merged over ./hackeval.yaml
    #[arg(short, long, global = true, env = "HACKEVAL_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the evaluation HTTP service
    Serve(ServeArgs),

    /// Show the rubric submissions are scored against
    Criteria,

    /// Evaluate a single submission file locally
    Evaluate(EvaluateArgs),

    /// Verify configuration, rubric and analysis engine
    Check,
}

impl Commands {
    /// Whether the command runs as a long-lived service.
    pub const fn is_service(&self) -> bool {
        matches!(self, Self::Serve(_))
    }
}
