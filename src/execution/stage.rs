//! Per-stage outcomes, reports, and the stage gate.

use crate::core::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The two fan-out stages of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Stage 1: build and persist per-area report content.
    Content,
    /// Stage 2: render the final document from the persisted artifact.
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Content => write!(f, "content"),
            Stage::Render => write!(f, "render"),
        }
    }
}

/// Status of one work item in one stage.
///
/// Per-item faults are captured here rather than propagated: one bad
/// area must never abort processing of the other 31 within a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageOutcome {
    /// The item completed normally.
    Ok,
    /// The generated content carried fewer fields than the contract.
    TooFewFields {
        /// Contracted field count.
        expected: usize,
        /// Observed field count.
        found: usize,
    },
    /// The generated content carried more fields than the contract.
    TooManyFields {
        /// Contracted field count.
        expected: usize,
        /// Observed field count.
        found: usize,
    },
    /// Stage 2 found no persisted artifact for the item.
    MissingArtifact,
    /// The task raised or panicked; the message is the captured fault.
    Fault(String),
}

impl StageOutcome {
    /// Whether this is the single designated success value.
    pub fn is_ok(&self) -> bool {
        matches!(self, StageOutcome::Ok)
    }
}

impl fmt::Display for StageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageOutcome::Ok => write!(f, "ok"),
            StageOutcome::TooFewFields { expected, found } => {
                write!(f, "too few fields (expected {}, found {})", expected, found)
            }
            StageOutcome::TooManyFields { expected, found } => {
                write!(f, "too many fields (expected {}, found {})", expected, found)
            }
            StageOutcome::MissingArtifact => write!(f, "missing artifact"),
            StageOutcome::Fault(message) => write!(f, "fault: {}", message),
        }
    }
}

/// Ordered (area, outcome) sequence for one stage.
///
/// Outcome order always matches work-item order, regardless of how
/// execution interleaved across workers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    stage: Stage,
    outcomes: Vec<(String, StageOutcome)>,
    /// Wall-clock time the stage took, in milliseconds.
    pub duration_ms: u64,
}

impl StageReport {
    /// Create a report from collected outcomes.
    pub fn new(stage: Stage, outcomes: Vec<(String, StageOutcome)>) -> Self {
        Self {
            stage,
            outcomes,
            duration_ms: 0,
        }
    }

    /// Which stage this report covers.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Outcomes in work-item order.
    pub fn outcomes(&self) -> &[(String, StageOutcome)] {
        &self.outcomes
    }

    /// Number of outcomes (always equals the item count).
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Check if the report is empty.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Whether every outcome is `Ok`.
    pub fn all_ok(&self) -> bool {
        self.outcomes.iter().all(|(_, o)| o.is_ok())
    }

    /// Names of items with abnormal outcomes, in work-item order.
    pub fn offenders(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|(_, o)| !o.is_ok())
            .map(|(area, _)| area.clone())
            .collect()
    }

    /// The stage gate: abort the pipeline if any outcome is abnormal.
    ///
    /// The error names every offending area and the artifact directory
    /// to inspect, so remediation can be targeted.
    pub fn gate(&self, artifact_dir: &Path) -> PipelineResult<()> {
        let offenders = self.offenders();
        if offenders.is_empty() {
            return Ok(());
        }
        for (area, outcome) in self.outcomes.iter().filter(|(_, o)| !o.is_ok()) {
            log::warn!("{} stage: {} -> {}", self.stage, area, outcome);
        }
        Err(PipelineError::StageFailed {
            stage: self.stage,
            offenders,
            artifact_dir: artifact_dir.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn mixed_report() -> StageReport {
        StageReport::new(
            Stage::Content,
            vec![
                ("Angus".to_string(), StageOutcome::Ok),
                (
                    "Fife".to_string(),
                    StageOutcome::TooFewFields {
                        expected: 430,
                        found: 429,
                    },
                ),
                ("Moray".to_string(), StageOutcome::Ok),
                ("Stirling".to_string(), StageOutcome::MissingArtifact),
            ],
        )
    }

    #[test]
    fn test_offenders_in_item_order() {
        let report = mixed_report();
        assert!(!report.all_ok());
        assert_eq!(report.offenders(), vec!["Fife", "Stirling"]);
    }

    #[test]
    fn test_gate_passes_when_all_ok() {
        let report = StageReport::new(
            Stage::Render,
            vec![("Angus".to_string(), StageOutcome::Ok)],
        );
        assert!(report.gate(&PathBuf::from("temp")).is_ok());
    }

    #[test]
    fn test_gate_names_every_offender() {
        let err = mixed_report().gate(&PathBuf::from("temp")).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Fife"));
        assert!(message.contains("Stirling"));
        assert!(!message.contains("Angus"));
        assert!(message.contains("temp"));
    }

    #[test]
    fn test_outcome_display() {
        let outcome = StageOutcome::TooManyFields {
            expected: 430,
            found: 431,
        };
        assert_eq!(outcome.to_string(), "too many fields (expected 430, found 431)");
    }
}
