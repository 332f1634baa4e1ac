//! Error types for Strath.
//!
//! Uses thiserror for structured errors with context. Errors are designed to:
//! - Name every offending council area, never just the first
//! - Point the operator at the location to inspect (`temp/`, `output/`)
//! - Support conversion between concern-specific error types

use crate::execution::stage::Stage;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Strath.
///
/// This enum encompasses all error categories and enables automatic
/// conversion between specific error types.
#[derive(Error, Debug)]
pub enum StrathError {
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Run-terminating errors raised by the pipeline orchestrator.
///
/// Per-area faults never surface here directly; they are captured as
/// [`StageOutcome`](crate::execution::stage::StageOutcome)s and escalate
/// only at a stage gate, carrying the full offender list.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(
        "{stage} stage failed for {} area(s): {}. Inspect artifacts and logs under '{}'",
        .offenders.len(),
        .offenders.join(", "),
        .artifact_dir.display(),
    )]
    StageFailed {
        stage: Stage,
        offenders: Vec<String>,
        artifact_dir: PathBuf,
    },

    #[error(
        "schema validation failed for {} rule(s): {}",
        .failed_rules.len(),
        .failed_rules.join(", "),
    )]
    SchemaGate { failed_rules: Vec<String> },

    #[error("failed to build worker pool: {0}")]
    PoolBuild(String),

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the artifact store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("missing artifact for '{key}' (expected at {})", .path.display())]
    MissingArtifact { key: String, path: PathBuf },

    #[error("I/O error for '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("bad artifact payload for '{key}': {source}")]
    Payload {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from a content-builder collaborator.
///
/// The builder is external to the pipeline; anything it reports is wrapped
/// here and captured as a per-area outcome, never a process-level fault.
#[derive(Error, Debug, Clone)]
pub enum BuildError {
    #[error("content build failed: {0}")]
    Failed(String),

    #[error("dataset has no sheet '{0}'")]
    MissingSheet(String),
}

/// Errors from a renderer collaborator.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("render failed: {0}")]
    Failed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Council areas named by this error, if it carries any.
    pub fn offending_areas(&self) -> &[String] {
        match self {
            PipelineError::StageFailed { offenders, .. } => offenders,
            _ => &[],
        }
    }
}

/// Result type alias for Strath operations.
pub type StrathResult<T> = Result<T, StrathError>;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type alias for artifact store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_failed_names_every_offender() {
        let err = PipelineError::StageFailed {
            stage: Stage::Content,
            offenders: vec!["Fife".to_string(), "Moray".to_string()],
            artifact_dir: PathBuf::from("temp"),
        };

        let message = err.to_string();
        assert!(message.contains("Fife"));
        assert!(message.contains("Moray"));
        assert!(message.contains("temp"));
        assert_eq!(err.offending_areas().len(), 2);
    }

    #[test]
    fn test_schema_gate_names_failed_rules() {
        let err = PipelineError::SchemaGate {
            failed_rules: vec!["population-rows".to_string()],
        };
        assert!(err.to_string().contains("population-rows"));
    }

    #[test]
    fn test_missing_artifact_names_path() {
        let err = StoreError::MissingArtifact {
            key: "Fife".to_string(),
            path: PathBuf::from("temp/fife.json"),
        };
        assert!(err.to_string().contains("fife.json"));
    }
}
