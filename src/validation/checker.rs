//! The schema conformance checker.
//!
//! Pure and deterministic: the same dataset and spec always produce the
//! same report, and nothing is mutated. A single invocation reports
//! every violation, so one bad sheet is not rediscovered 32 times
//! downstream, once per report build.

use crate::core::dataset::Dataset;
use crate::validation::report::{RuleOutcome, ValidationReport};
use crate::validation::rules::{Check, ExpectationSpec, Rule};
use serde_json::Value;
use std::time::Instant;

/// Check a dataset against an expectation spec.
///
/// Every rule is evaluated; a failing rule never short-circuits the
/// rest. Missing targets fail the rule with a missing-target diagnostic
/// rather than raising.
pub fn check(dataset: &Dataset, spec: &ExpectationSpec) -> ValidationReport {
    let start = Instant::now();
    let mut report = ValidationReport::new();

    for rule in spec.rules() {
        let outcome = match locate(dataset, rule) {
            Some(value) => apply_check(rule, value),
            None => RuleOutcome::Fail {
                message: format!("missing target '{}'", rule.target),
                severity: rule.severity,
            },
        };
        report.record(rule.id.clone(), outcome);
    }

    report.duration_ms = start.elapsed().as_millis() as u64;
    report
}

/// Resolve a rule's target inside the dataset.
fn locate<'a>(dataset: &'a Dataset, rule: &Rule) -> Option<&'a Value> {
    let mut value = dataset.sheet(&rule.target.sheet)?;
    for key in &rule.target.path {
        value = value.as_object()?.get(key)?;
    }
    Some(value)
}

/// Apply one rule's check to the located value.
fn apply_check(rule: &Rule, value: &Value) -> RuleOutcome {
    let failure = match &rule.check {
        Check::RowCount(expected) => check_row_count(value, *expected),
        Check::Columns(columns) => check_columns(value, columns),
        Check::ValueRange { column, min, max } => check_value_range(value, column, *min, *max),
        Check::NonEmpty => check_non_empty(value),
    };

    match failure {
        None => RuleOutcome::Pass,
        Some(message) => RuleOutcome::Fail {
            message: format!("{}: {}", rule.target, message),
            severity: rule.severity,
        },
    }
}

fn check_row_count(value: &Value, expected: usize) -> Option<String> {
    match value.as_array() {
        Some(rows) if rows.len() == expected => None,
        Some(rows) => Some(format!("expected {} rows, found {}", expected, rows.len())),
        None => Some("expected an array of rows".to_string()),
    }
}

fn check_columns(value: &Value, columns: &[String]) -> Option<String> {
    let rows = match value.as_array() {
        Some(rows) => rows,
        None => return Some("expected an array of rows".to_string()),
    };

    for (index, row) in rows.iter().enumerate() {
        let row = match row.as_object() {
            Some(row) => row,
            None => return Some(format!("row {} is not an object", index)),
        };
        let missing: Vec<_> = columns
            .iter()
            .filter(|c| !row.contains_key(c.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Some(format!(
                "row {} missing column(s): {}",
                index,
                missing.join(", ")
            ));
        }
    }
    None
}

fn check_value_range(value: &Value, column: &str, min: f64, max: f64) -> Option<String> {
    let rows = match value.as_array() {
        Some(rows) => rows,
        None => return Some("expected an array of rows".to_string()),
    };

    for (index, row) in rows.iter().enumerate() {
        let observed = match row.get(column).and_then(Value::as_f64) {
            Some(n) => n,
            None => {
                return Some(format!("row {} has no numeric column '{}'", index, column));
            }
        };
        if observed < min || observed > max {
            return Some(format!(
                "row {} column '{}': expected {}..={}, found {}",
                index, column, min, max, observed
            ));
        }
    }
    None
}

fn check_non_empty(value: &Value) -> Option<String> {
    let empty = match value {
        Value::Array(rows) => rows.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => true,
    };
    if empty {
        Some("expected a non-empty array or object".to_string())
    } else {
        None
    }
}
