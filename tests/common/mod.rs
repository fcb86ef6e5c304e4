//! Common test utilities for integration tests
//!
//! Provides shared fixtures, helpers, and test utilities used across
//! multiple integration test files.

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use hackeval::adapters::engines::MockAnalysisEngine;
use hackeval::services::{EvaluationPipeline, SingleFlightGate};

pub const BOUNDARY: &str = "hackeval-test-boundary";

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Pipeline over `engine` whose transient files land in `dir`.
pub fn mock_pipeline(engine: &Arc<MockAnalysisEngine>, dir: &TempDir) -> EvaluationPipeline {
    EvaluationPipeline::new(engine.clone(), SingleFlightGate::global()).with_workdir(dir.path())
}

/// Whether `dir` holds no files.
pub fn dir_is_empty(dir: &TempDir) -> bool {
    std::fs::read_dir(dir.path())
        .expect("Failed to read temp dir")
        .next()
        .is_none()
}

/// Write `contents` to `name` inside `dir`.
pub fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("Failed to create file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write file");
    path
}

/// Build a multipart/form-data body with an optional file part and mode.
pub fn multipart_body(file: Option<(&str, &[u8])>, agent_mode: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(mode) = agent_mode {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"agent_mode\"\r\n\r\n{mode}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}
