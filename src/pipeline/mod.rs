//! The pipeline orchestrator.
//!
//! Sequences load → validate → merge → content fan-out → gate → render
//! fan-out → gate → summary. All concurrency is delegated to the worker
//! pool inside each stage; the orchestrator itself is sequential, and a
//! stage boundary is a full barrier.

pub mod collaborators;

pub use collaborators::{ContentBuilder, JsonDocumentRenderer, Renderer};

use crate::core::areas::{output_name, DEFAULT_OUTPUT_SUFFIX};
use crate::core::artifact::CONTENT_FIELD_COUNT;
use crate::core::dataset::Dataset;
use crate::core::error::{PipelineError, PipelineResult, StoreError, StrathResult};
use crate::execution::pool::WorkerPool;
use crate::execution::stage::{Stage, StageOutcome, StageReport};
use crate::store::artifact_store::ArtifactStore;
use crate::validation::checker::check;
use crate::validation::report::ValidationReport;
use crate::validation::rules::ExpectationSpec;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How schema validation failures affect the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaGate {
    /// Failures are logged; the run proceeds. Matches the historically
    /// observed flow.
    ReportOnly,
    /// Any Error-severity failure aborts the run before the merge.
    Fatal,
}

/// Pipeline options.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Worker thread count (0 = detected hardware concurrency).
    pub workers: usize,
    /// Contracted field count for generated content.
    pub expected_fields: usize,
    /// Fields that must be present in generated content, checked in
    /// addition to the count. Empty by default; the count stays the
    /// authoritative gate.
    pub required_fields: Vec<String>,
    /// Whether schema validation failures are fatal.
    pub schema_gate: SchemaGate,
    /// Directory for the transient artifact handoff.
    pub temp_dir: PathBuf,
    /// Directory for rendered documents.
    pub output_dir: PathBuf,
    /// Suffix appended to each area's slug to name its document.
    pub output_suffix: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            workers: 0, // Use all available
            expected_fields: CONTENT_FIELD_COUNT,
            required_fields: Vec::new(),
            schema_gate: SchemaGate::ReportOnly,
            temp_dir: PathBuf::from("temp"),
            output_dir: PathBuf::from("output"),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
        }
    }
}

impl PipelineOptions {
    /// Create a new options builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker thread count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the contracted field count.
    pub fn with_expected_fields(mut self, count: usize) -> Self {
        self.expected_fields = count;
        self
    }

    /// Require named fields in generated content.
    pub fn with_required_fields(mut self, fields: Vec<String>) -> Self {
        self.required_fields = fields;
        self
    }

    /// Set the schema gate behaviour.
    pub fn with_schema_gate(mut self, gate: SchemaGate) -> Self {
        self.schema_gate = gate;
        self
    }

    /// Set the artifact handoff directory.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Set the rendered-document directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the document name suffix.
    pub fn with_output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.output_suffix = suffix.into();
        self
    }
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    /// Schema validation report.
    pub validation: ValidationReport,
    /// Per-area outcomes of the content stage.
    pub content: StageReport,
    /// Per-area outcomes of the render stage.
    pub render: StageReport,
    /// Rendered document paths, in area order.
    pub outputs: Vec<PathBuf>,
    /// Total wall-clock time for the run.
    pub elapsed: Duration,
}

/// The report pipeline.
///
/// Owns the two collaborator seams and the run options; one instance can
/// run many datasets.
pub struct ReportPipeline<B, R> {
    builder: B,
    renderer: R,
    options: PipelineOptions,
}

impl<B, R> ReportPipeline<B, R>
where
    B: ContentBuilder,
    R: Renderer,
{
    /// Create a pipeline with default options.
    pub fn new(builder: B, renderer: R) -> Self {
        Self {
            builder,
            renderer,
            options: PipelineOptions::default(),
        }
    }

    /// Replace the options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// Current options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run the full pipeline over `areas`.
    ///
    /// The pool lives exactly as long as this call: it is created after
    /// validation and torn down by scope exit on every path, completed
    /// or aborted.
    pub fn run(
        &self,
        dataset: Dataset,
        spec: &ExpectationSpec,
        areas: &[String],
    ) -> PipelineResult<RunSummary> {
        let start = Instant::now();

        // 1-2. Validate and gate per configuration.
        let validation = check(&dataset, spec);
        log::info!("schema validation: {}", validation.summary());
        for line in validation.detailed_failures() {
            log::warn!("schema validation: {}", line);
        }
        if self.options.schema_gate == SchemaGate::Fatal {
            let failed_rules = validation.failing_errors();
            if !failed_rules.is_empty() {
                return Err(PipelineError::SchemaGate { failed_rules });
            }
        }

        // 3. The merged dataset is what the workers see.
        let merged = dataset.apply_updates();

        let store = ArtifactStore::new(&self.options.temp_dir)?;
        std::fs::create_dir_all(&self.options.output_dir)?;

        // 4. Pool and broadcast.
        let pool = WorkerPool::new(self.options.workers)?;
        let shared = pool.broadcast(merged);

        // 5. Content stage, then gate.
        let content = self.content_stage(&pool, &store, &shared, areas);
        content.gate(store.dir())?;

        // 6. Render stage, then gate.
        let render = self.render_stage(&pool, &store, areas);
        render.gate(store.dir())?;

        // 8. Summary with elapsed wall-clock time.
        let outputs = areas
            .iter()
            .map(|area| self.output_path(area))
            .collect::<Vec<_>>();
        let elapsed = start.elapsed();
        log::info!(
            "run complete: {} document(s) in {:.2}s",
            outputs.len(),
            elapsed.as_secs_f64()
        );

        Ok(RunSummary {
            validation,
            content,
            render,
            outputs,
            elapsed,
        })
    }

    /// Load a dataset from a JSON file and run the full pipeline.
    ///
    /// Binary entry points get one error type for the whole call: I/O
    /// and parse failures surface alongside pipeline aborts under
    /// [`StrathError`](crate::core::error::StrathError).
    pub fn run_file(
        &self,
        dataset_path: impl AsRef<Path>,
        spec: &ExpectationSpec,
        areas: &[String],
    ) -> StrathResult<RunSummary> {
        let raw = std::fs::read_to_string(dataset_path.as_ref())?;
        let dataset: Dataset = serde_json::from_str(&raw)?;
        Ok(self.run(dataset, spec, areas)?)
    }

    /// Deterministic document path for an area.
    fn output_path(&self, area: &str) -> PathBuf {
        self.options
            .output_dir
            .join(output_name(area, &self.options.output_suffix))
    }

    /// Stage 1: build, persist, and contract-check content per area.
    fn content_stage(
        &self,
        pool: &WorkerPool,
        store: &ArtifactStore,
        shared: &Arc<Dataset>,
        areas: &[String],
    ) -> StageReport {
        pool.run_stage(Stage::Content, areas, shared, |area, dataset| {
            let artifact = match self.builder.build(area, dataset) {
                Ok(artifact) => artifact,
                Err(e) => return StageOutcome::Fault(e.to_string()),
            };

            if artifact.area() != Some(area) {
                return StageOutcome::Fault(format!(
                    "artifact area field is {:?}, expected '{}'",
                    artifact.area(),
                    area
                ));
            }
            for field in &self.options.required_fields {
                if artifact.get(field).is_none() {
                    return StageOutcome::Fault(format!("missing required field '{}'", field));
                }
            }

            // Persist before the cardinality check so a rejected
            // artifact is still on disk for inspection.
            if let Err(e) = store.put(area, &artifact) {
                return StageOutcome::Fault(e.to_string());
            }

            let expected = self.options.expected_fields;
            let found = artifact.field_count();
            match found.cmp(&expected) {
                Ordering::Less => StageOutcome::TooFewFields { expected, found },
                Ordering::Greater => StageOutcome::TooManyFields { expected, found },
                Ordering::Equal => StageOutcome::Ok,
            }
        })
    }

    /// Stage 2: consume each artifact and render the final document.
    fn render_stage(
        &self,
        pool: &WorkerPool,
        store: &ArtifactStore,
        areas: &[String],
    ) -> StageReport {
        let shared = pool.broadcast(());
        pool.run_stage(Stage::Render, areas, &shared, |area, _| {
            if !store.exists(area) {
                return StageOutcome::MissingArtifact;
            }
            let artifact = match store.get_and_delete(area) {
                Ok(artifact) => artifact,
                Err(StoreError::MissingArtifact { .. }) => return StageOutcome::MissingArtifact,
                Err(e) => return StageOutcome::Fault(e.to_string()),
            };

            match self.renderer.render(&artifact, &self.output_path(area)) {
                Ok(()) => StageOutcome::Ok,
                Err(e) => StageOutcome::Fault(e.to_string()),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifact::ContentArtifact;
    use crate::core::dataset::UPDATES_SHEET;
    use crate::core::error::{BuildError, RenderError, StrathError};
    use crate::validation::rules::{Check, Rule, Target};
    use serde_json::json;
    use std::path::Path;
    use tempfile::tempdir;

    const FIELDS: usize = 5;

    fn dataset() -> Dataset {
        let mut dataset = Dataset::new();
        dataset.insert_sheet(
            "population",
            json!([
                {"area": "A", "count": 10},
                {"area": "B", "count": 20},
                {"area": "C", "count": 30},
            ]),
        );
        dataset
    }

    fn spec() -> ExpectationSpec {
        ExpectationSpec::new().rule(Rule::new(
            "population-rows",
            Target::sheet("population"),
            Check::RowCount(3),
        ))
    }

    fn areas() -> Vec<String> {
        vec!["A".to_string(), "B".to_string(), "C".to_string()]
    }

    /// Builder producing exactly FIELDS fields for every area.
    fn build_ok(area: &str, _dataset: &Dataset) -> Result<ContentArtifact, BuildError> {
        let mut artifact = ContentArtifact::new(area);
        for i in 1..FIELDS {
            artifact.set(format!("field_{}", i), json!(i));
        }
        Ok(artifact)
    }

    fn render_ok(artifact: &ContentArtifact, path: &Path) -> Result<(), RenderError> {
        std::fs::write(path, artifact.area().unwrap_or_default())?;
        Ok(())
    }

    fn options(root: &Path) -> PipelineOptions {
        PipelineOptions::new()
            .with_workers(2)
            .with_expected_fields(FIELDS)
            .with_temp_dir(root.join("temp"))
            .with_output_dir(root.join("output"))
            .with_output_suffix("-profile.txt")
    }

    #[test]
    fn test_end_to_end_success() {
        let root = tempdir().unwrap();
        let pipeline =
            ReportPipeline::new(build_ok, render_ok).with_options(options(root.path()));

        let summary = pipeline.run(dataset(), &spec(), &areas()).unwrap();

        assert!(summary.validation.is_clean());
        assert!(summary.content.all_ok());
        assert!(summary.render.all_ok());
        assert_eq!(summary.outputs.len(), 3);

        // Documents at deterministic paths, temp/ fully consumed.
        for (area, expected) in ["A", "B", "C"].iter().zip([
            "a-profile.txt",
            "b-profile.txt",
            "c-profile.txt",
        ]) {
            let path = root.path().join("output").join(expected);
            assert_eq!(std::fs::read_to_string(&path).unwrap(), *area);
        }
        let leftovers = std::fs::read_dir(root.path().join("temp")).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_cardinality_failure_names_exactly_the_bad_area() {
        let root = tempdir().unwrap();

        // One area returns FIELDS - 1 fields; the others conform.
        let builder = |area: &str, dataset: &Dataset| {
            let mut artifact = build_ok(area, dataset)?;
            if area == "B" {
                let fields: indexmap::IndexMap<_, _> = artifact
                    .fields()
                    .take(FIELDS - 1)
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                artifact = ContentArtifact::from_fields(fields);
            }
            Ok(artifact)
        };

        let pipeline = ReportPipeline::new(builder, render_ok).with_options(options(root.path()));
        let err = pipeline.run(dataset(), &spec(), &areas()).unwrap_err();

        assert_eq!(err.offending_areas(), ["B".to_string()]);
        assert!(err.to_string().contains("content stage failed"));
        // Gate fired before stage 2: nothing rendered.
        assert_eq!(
            std::fs::read_dir(root.path().join("output")).unwrap().count(),
            0
        );
    }

    #[test]
    fn test_surplus_field_gate_names_exactly_the_bad_area() {
        let root = tempdir().unwrap();
        let opts = options(root.path());

        // One area returns FIELDS + 1 fields; the others conform.
        let builder = |area: &str, dataset: &Dataset| {
            let mut artifact = build_ok(area, dataset)?;
            if area == "B" {
                artifact.set("surplus", json!(true));
            }
            Ok(artifact)
        };

        let pipeline = ReportPipeline::new(builder, render_ok).with_options(opts.clone());

        let store = ArtifactStore::new(&opts.temp_dir).unwrap();
        let pool = WorkerPool::new(2).unwrap();
        let shared = pool.broadcast(dataset());
        let content = pipeline.content_stage(&pool, &store, &shared, &areas());

        assert_eq!(content.offenders(), vec!["B"]);
        assert_eq!(
            content.outcomes()[1].1,
            StageOutcome::TooManyFields {
                expected: FIELDS,
                found: FIELDS + 1,
            }
        );

        let err = content.gate(store.dir()).unwrap_err();
        assert_eq!(err.offending_areas(), ["B".to_string()]);
        assert!(err.to_string().contains("content stage failed"));
    }

    #[test]
    fn test_externally_deleted_artifact_is_missing_for_that_area_only() {
        let root = tempdir().unwrap();
        let opts = options(root.path());
        let pipeline = ReportPipeline::new(build_ok, render_ok).with_options(opts.clone());

        let store = ArtifactStore::new(&opts.temp_dir).unwrap();
        std::fs::create_dir_all(&opts.output_dir).unwrap();
        let pool = WorkerPool::new(2).unwrap();
        let shared = pool.broadcast(dataset());
        let work = areas();

        let content = pipeline.content_stage(&pool, &store, &shared, &work);
        assert!(content.all_ok());

        // Simulate external deletion between the stages.
        std::fs::remove_file(store.path_for("B")).unwrap();

        let render = pipeline.render_stage(&pool, &store, &work);
        assert_eq!(render.offenders(), vec!["B"]);
        assert_eq!(render.outcomes()[1].1, StageOutcome::MissingArtifact);

        // The other areas still rendered at their deterministic paths.
        assert!(opts.output_dir.join("a-profile.txt").exists());
        assert!(opts.output_dir.join("c-profile.txt").exists());

        let err = render.gate(store.dir()).unwrap_err();
        assert_eq!(err.offending_areas(), ["B".to_string()]);
    }

    #[test]
    fn test_builder_fault_isolated_and_reported() {
        let root = tempdir().unwrap();
        let builder = |area: &str, dataset: &Dataset| {
            if area == "C" {
                return Err(BuildError::MissingSheet("mortality".to_string()));
            }
            build_ok(area, dataset)
        };

        let pipeline = ReportPipeline::new(builder, render_ok).with_options(options(root.path()));
        let err = pipeline.run(dataset(), &spec(), &areas()).unwrap_err();
        assert_eq!(err.offending_areas(), ["C".to_string()]);
    }

    #[test]
    fn test_render_fault_escalates_at_second_gate() {
        let root = tempdir().unwrap();
        let renderer = |artifact: &ContentArtifact, path: &Path| {
            if artifact.area() == Some("A") {
                return Err(RenderError::Failed("template error".to_string()));
            }
            render_ok(artifact, path)
        };

        let pipeline = ReportPipeline::new(build_ok, renderer).with_options(options(root.path()));
        let err = pipeline.run(dataset(), &spec(), &areas()).unwrap_err();

        assert_eq!(err.offending_areas(), ["A".to_string()]);
        assert!(err.to_string().contains("render stage failed"));
    }

    #[test]
    fn test_schema_gate_report_only_proceeds() {
        let root = tempdir().unwrap();
        let bad_spec = ExpectationSpec::new().rule(Rule::new(
            "population-rows",
            Target::sheet("population"),
            Check::RowCount(99),
        ));

        let pipeline =
            ReportPipeline::new(build_ok, render_ok).with_options(options(root.path()));
        let summary = pipeline.run(dataset(), &bad_spec, &areas()).unwrap();

        assert!(!summary.validation.is_clean());
        assert!(summary.render.all_ok());
    }

    #[test]
    fn test_schema_gate_fatal_aborts_before_merge() {
        let root = tempdir().unwrap();
        let bad_spec = ExpectationSpec::new().rule(Rule::new(
            "population-rows",
            Target::sheet("population"),
            Check::RowCount(99),
        ));

        let pipeline = ReportPipeline::new(build_ok, render_ok)
            .with_options(options(root.path()).with_schema_gate(SchemaGate::Fatal));
        let err = pipeline.run(dataset(), &bad_spec, &areas()).unwrap_err();

        assert!(matches!(
            err,
            PipelineError::SchemaGate { ref failed_rules } if failed_rules == &["population-rows"]
        ));
    }

    #[test]
    fn test_workers_see_the_merged_dataset() {
        let root = tempdir().unwrap();
        let mut patched = dataset();
        patched.insert_sheet("factor", json!({"scale": 1}));
        patched.insert_sheet(UPDATES_SHEET, json!({"factor": {"scale": 7}}));

        // Builder snapshots the broadcast value of factor.scale.
        let builder = |area: &str, dataset: &Dataset| -> Result<ContentArtifact, BuildError> {
            let mut artifact = ContentArtifact::new(area);
            artifact.set("scale", dataset.sheet("factor").unwrap()["scale"].clone());
            for i in 2..FIELDS {
                artifact.set(format!("field_{}", i), json!(i));
            }
            Ok(artifact)
        };
        let renderer = |artifact: &ContentArtifact, path: &Path| -> Result<(), RenderError> {
            std::fs::write(path, artifact.get("scale").unwrap().to_string())?;
            Ok(())
        };

        let pipeline = ReportPipeline::new(builder, renderer).with_options(options(root.path()));
        pipeline.run(patched, &ExpectationSpec::new(), &areas()).unwrap();

        let rendered =
            std::fs::read_to_string(root.path().join("output").join("a-profile.txt")).unwrap();
        assert_eq!(rendered, "7");
    }

    #[test]
    fn test_run_file_end_to_end() {
        let root = tempdir().unwrap();
        let data = root.path().join("profiles.json");
        std::fs::write(&data, serde_json::to_string(&dataset()).unwrap()).unwrap();

        let pipeline =
            ReportPipeline::new(build_ok, render_ok).with_options(options(root.path()));
        let summary = pipeline.run_file(&data, &spec(), &areas()).unwrap();

        assert!(summary.render.all_ok());
        assert!(root.path().join("output").join("b-profile.txt").exists());
    }

    #[test]
    fn test_run_file_wraps_load_failures() {
        let root = tempdir().unwrap();
        let pipeline =
            ReportPipeline::new(build_ok, render_ok).with_options(options(root.path()));

        let missing = pipeline
            .run_file(root.path().join("absent.json"), &spec(), &areas())
            .unwrap_err();
        assert!(matches!(missing, StrathError::Io(_)));

        let garbled = root.path().join("garbled.json");
        std::fs::write(&garbled, "not a dataset").unwrap();
        let parse = pipeline.run_file(&garbled, &spec(), &areas()).unwrap_err();
        assert!(matches!(parse, StrathError::Serialization(_)));
    }

    #[test]
    fn test_required_fields_extension() {
        let root = tempdir().unwrap();
        let pipeline = ReportPipeline::new(build_ok, render_ok).with_options(
            options(root.path()).with_required_fields(vec!["no_such_field".to_string()]),
        );

        let err = pipeline.run(dataset(), &spec(), &areas()).unwrap_err();
        // Every area misses the field; all three are named.
        assert_eq!(err.offending_areas().len(), 3);
    }
}
