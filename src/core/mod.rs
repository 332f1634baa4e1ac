//! Core types for the Strath report pipeline.
//!
//! This module contains the foundational types shared by every stage:
//! - The multi-sheet dataset and its `updates` merge
//! - The per-area content artifact
//! - The fixed council-area work list and naming rules
//! - Error types

pub mod areas;
pub mod artifact;
pub mod dataset;
pub mod error;

// Re-export commonly used types
pub use areas::{council_areas, output_name, slugify, COUNCIL_AREAS, DEFAULT_OUTPUT_SUFFIX};
pub use artifact::{ContentArtifact, AREA_FIELD, CONTENT_FIELD_COUNT};
pub use dataset::{merge, Dataset, UPDATES_SHEET};
pub use error::{BuildError, PipelineError, RenderError, StoreError, StrathError};
