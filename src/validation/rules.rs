//! Expectation rules for dataset validation.
//!
//! An [`ExpectationSpec`] is an ordered set of rules, built once per run
//! and immutable afterwards. Each rule names a target location in the
//! dataset, the shape it expects there, and a severity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a failing rule affects the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Failure counts against the schema gate.
    Error,
    /// Failure is reported but never gates the run.
    Warning,
}

/// Where in the dataset a rule looks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Sheet name.
    pub sheet: String,
    /// Optional path of object keys below the sheet root.
    pub path: Vec<String>,
}

impl Target {
    /// Target a whole sheet.
    pub fn sheet(name: impl Into<String>) -> Self {
        Self {
            sheet: name.into(),
            path: Vec::new(),
        }
    }

    /// Descend one object key below the current target.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.path.push(key.into());
        self
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sheet)?;
        for key in &self.path {
            write!(f, ".{}", key)?;
        }
        Ok(())
    }
}

/// The shape/type/domain a rule expects at its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Check {
    /// Target is an array with exactly this many rows.
    RowCount(usize),
    /// Target is an array of row objects, each carrying all these columns.
    Columns(Vec<String>),
    /// Target is an array of row objects whose named column is numeric
    /// and within the closed range.
    ValueRange {
        /// Column to check in each row.
        column: String,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// Target exists and is a non-empty array or object.
    NonEmpty,
}

/// One expectation: a target, a check, a severity, and a stable id used
/// in reports and failure messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Stable identifier cited in diagnostics.
    pub id: String,
    /// Where to look.
    pub target: Target,
    /// What to expect there.
    pub check: Check,
    /// Whether a failure gates the run.
    pub severity: Severity,
}

impl Rule {
    /// Create an Error-severity rule.
    pub fn new(id: impl Into<String>, target: Target, check: Check) -> Self {
        Self {
            id: id.into(),
            target,
            check,
            severity: Severity::Error,
        }
    }

    /// Downgrade to Warning severity.
    pub fn warning(mut self) -> Self {
        self.severity = Severity::Warning;
        self
    }
}

/// An ordered, immutable set of expectation rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpectationSpec {
    rules: Vec<Rule>,
}

impl ExpectationSpec {
    /// Create an empty spec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule (builder style).
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if the spec has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
