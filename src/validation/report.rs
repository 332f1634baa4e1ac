//! The validation report produced by a schema check.

use crate::validation::rules::Severity;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Outcome of one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RuleOutcome {
    /// The target conformed.
    Pass,
    /// The target did not conform; the message cites observed vs expected.
    Fail {
        /// Diagnostic message.
        message: String,
        /// Severity declared on the rule.
        severity: Severity,
    },
}

impl RuleOutcome {
    /// Whether the rule passed.
    pub fn passed(&self) -> bool {
        matches!(self, RuleOutcome::Pass)
    }
}

/// Aggregated result of checking a dataset against an expectation spec.
///
/// Constructed once by [`check`](crate::validation::checker::check) and
/// never mutated afterwards. Outcomes keep rule declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Rule id -> outcome, in rule order.
    pub outcomes: IndexMap<String, RuleOutcome>,
    /// Time taken for validation in milliseconds.
    pub duration_ms: u64,
}

impl ValidationReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self {
            outcomes: IndexMap::new(),
            duration_ms: 0,
        }
    }

    /// Record the outcome for a rule.
    pub(crate) fn record(&mut self, rule_id: impl Into<String>, outcome: RuleOutcome) {
        self.outcomes.insert(rule_id.into(), outcome);
    }

    /// Whether every rule passed.
    pub fn is_clean(&self) -> bool {
        self.outcomes.values().all(|o| o.passed())
    }

    /// Ids of failing rules at any severity, in rule order.
    pub fn failing_rules(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|(_, o)| !o.passed())
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Ids of failing Error-severity rules, in rule order.
    pub fn failing_errors(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter(|(_, o)| {
                matches!(
                    o,
                    RuleOutcome::Fail {
                        severity: Severity::Error,
                        ..
                    }
                )
            })
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Get a human-readable summary.
    pub fn summary(&self) -> String {
        let failed = self.failing_rules().len();
        if failed == 0 {
            format!("✓ {} rule(s) passed", self.outcomes.len())
        } else {
            format!(
                "✗ {} of {} rule(s) failed: {}",
                failed,
                self.outcomes.len(),
                self.failing_rules().join(", ")
            )
        }
    }

    /// Detailed diagnostic lines for every failing rule.
    pub fn detailed_failures(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .filter_map(|(id, outcome)| match outcome {
                RuleOutcome::Fail { message, severity } => {
                    Some(format!("[{:?}] {}: {}", severity, id, message))
                }
                RuleOutcome::Pass => None,
            })
            .collect()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}
