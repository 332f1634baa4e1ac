//! Schema validation for the loaded dataset.
//!
//! Validation runs before the fan-out stages to catch shape defects
//! early and report all of them at once.

pub mod checker;
pub mod report;
pub mod rules;

pub use checker::check;
pub use report::{RuleOutcome, ValidationReport};
pub use rules::{Check, ExpectationSpec, Rule, Severity, Target};
