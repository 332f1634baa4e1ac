//! # Strath - Council Area Report Pipeline
//!
//! Strath validates a multi-sheet dataset against a declared expectation
//! spec, then fans a report-content-generation job out over Scotland's
//! 32 council areas and renders one document per area, gating the render
//! stage on the success of the content stage.
//!
//! ## Features
//!
//! - **Schema validation**: every rule violation reported in one pass,
//!   never just the first
//! - **Idempotent merge**: a declared `updates` sheet patches the base
//!   dataset without mutating it
//! - **Two-stage parallel fan-out**: bounded worker pool, outcomes in
//!   work-item order, per-item fault isolation
//! - **Fail-fast gating**: any abnormal outcome aborts the run with the
//!   full list of offending areas
//! - **Artifact handoff**: per-area content persisted to `temp/` between
//!   the stages and consumed exactly once
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strath::prelude::*;
//!
//! let dataset = Dataset::from_json_file("data/profiles.json")?;
//!
//! let spec = ExpectationSpec::new()
//!     .rule(Rule::new("population-rows", Target::sheet("population"), Check::RowCount(32)));
//!
//! let pipeline = ReportPipeline::new(build_content, render_document)
//!     .with_options(PipelineOptions::new().with_workers(8));
//!
//! let summary = pipeline.run(dataset, &spec, &council_areas())?;
//! println!("done in {:.2}s", summary.elapsed.as_secs_f64());
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: dataset, merge, artifact, council areas, error types
//! - [`validation`]: expectation rules and the conformance checker
//! - [`execution`]: worker pool and fan-out stage runner
//! - [`store`]: transient artifact storage between stages
//! - [`pipeline`]: the orchestrator and collaborator trait seams

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod execution;
pub mod pipeline;
pub mod store;
pub mod validation;

/// Prelude module for convenient imports.
///
/// Import everything commonly needed with:
/// ```rust,ignore
/// use strath::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use crate::core::areas::{council_areas, output_name, slugify, COUNCIL_AREAS};
    pub use crate::core::artifact::{ContentArtifact, AREA_FIELD, CONTENT_FIELD_COUNT};
    pub use crate::core::dataset::{merge, Dataset, UPDATES_SHEET};

    // Errors
    pub use crate::core::error::{
        BuildError, PipelineError, RenderError, StoreError, StrathError,
    };

    // Validation
    pub use crate::validation::checker::check;
    pub use crate::validation::report::{RuleOutcome, ValidationReport};
    pub use crate::validation::rules::{Check, ExpectationSpec, Rule, Severity, Target};

    // Execution
    pub use crate::execution::pool::WorkerPool;
    pub use crate::execution::stage::{Stage, StageOutcome, StageReport};

    // Store
    pub use crate::store::artifact_store::ArtifactStore;

    // Pipeline
    pub use crate::pipeline::collaborators::{ContentBuilder, JsonDocumentRenderer, Renderer};
    pub use crate::pipeline::{PipelineOptions, ReportPipeline, RunSummary, SchemaGate};
}

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
        assert_eq!(super::NAME, "strath");
    }

    #[test]
    fn test_work_list_is_fixed() {
        let areas = council_areas();
        assert_eq!(areas.len(), 32);
        assert_eq!(areas[0], COUNCIL_AREAS[0]);
    }
}
