//! Trait seams for the external collaborators.
//!
//! Content building (plotting, table building, text generation) and
//! document rendering are opaque to the pipeline; it only depends on
//! their input/output contracts. Closures implement both traits, which
//! keeps tests and small scripts free of ceremony.

use crate::core::artifact::ContentArtifact;
use crate::core::dataset::Dataset;
use crate::core::error::{BuildError, RenderError};
use std::path::Path;

/// Builds the report content for one council area.
///
/// Must be pure with respect to shared state: it receives a read-only
/// dataset and returns a mapping whose size the pipeline checks against
/// the contracted cardinality, carrying an `area` field equal to the
/// area it was called for.
pub trait ContentBuilder: Send + Sync {
    /// Build the content mapping for `area` from the merged dataset.
    fn build(&self, area: &str, dataset: &Dataset) -> Result<ContentArtifact, BuildError>;
}

impl<F> ContentBuilder for F
where
    F: Fn(&str, &Dataset) -> Result<ContentArtifact, BuildError> + Send + Sync,
{
    fn build(&self, area: &str, dataset: &Dataset) -> Result<ContentArtifact, BuildError> {
        self(area, dataset)
    }
}

/// Renders one final document from a loaded content artifact.
///
/// The artifact is passed explicitly; the renderer never discovers
/// content through filename conventions or other side channels.
pub trait Renderer: Send + Sync {
    /// Render `artifact` to a document at `output_path`.
    fn render(&self, artifact: &ContentArtifact, output_path: &Path) -> Result<(), RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&ContentArtifact, &Path) -> Result<(), RenderError> + Send + Sync,
{
    fn render(&self, artifact: &ContentArtifact, output_path: &Path) -> Result<(), RenderError> {
        self(artifact, output_path)
    }
}

/// Renderer that writes the artifact fields as a pretty-printed JSON
/// document. Used by the demo CLI and as a stand-in where no real
/// rendering engine is wired up.
#[derive(Debug, Clone, Default)]
pub struct JsonDocumentRenderer;

impl Renderer for JsonDocumentRenderer {
    fn render(&self, artifact: &ContentArtifact, output_path: &Path) -> Result<(), RenderError> {
        let document = serde_json::to_string_pretty(artifact)
            .map_err(|e| RenderError::Failed(e.to_string()))?;
        std::fs::write(output_path, document)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_closure_implements_content_builder() {
        let builder = |area: &str, _dataset: &Dataset| -> Result<ContentArtifact, BuildError> {
            let mut artifact = ContentArtifact::new(area);
            artifact.set("summary", json!(1));
            Ok(artifact)
        };

        let artifact = builder.build("Fife", &Dataset::new()).unwrap();
        assert_eq!(artifact.area(), Some("Fife"));
    }

    #[test]
    fn test_json_document_renderer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fife-profile.json");

        let mut artifact = ContentArtifact::new("Fife");
        artifact.set("summary", json!({"rows": 2}));

        JsonDocumentRenderer.render(&artifact, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Fife"));
        assert!(written.contains("summary"));
    }
}
