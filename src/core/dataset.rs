//! The multi-sheet dataset and the `updates` merge.
//!
//! A dataset is an ordered mapping from sheet name to sheet content.
//! Sheet content is arbitrary JSON: tabular sheets are arrays of row
//! objects, lookup sheets are plain objects. The reserved sheet
//! `updates` holds an object keyed by sheet name whose values patch the
//! corresponding sheets before anything downstream sees the data.

use crate::core::error::PipelineError;
use indexmap::IndexMap;
use serde_json::Value;
use std::path::Path;

/// Name of the reserved patch sheet.
pub const UPDATES_SHEET: &str = "updates";

/// An ordered, multi-sheet dataset.
///
/// Sheet order is preserved from the source file so that validation
/// reports and log output are deterministic across runs.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Dataset {
    sheets: IndexMap<String, Value>,
}

impl Dataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self {
            sheets: IndexMap::new(),
        }
    }

    /// Load a dataset from its canonical JSON representation on disk.
    ///
    /// The spreadsheet reader proper is an external collaborator; JSON is
    /// the interface form it hands over.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let sheets: IndexMap<String, Value> = serde_json::from_str(&raw)
            .map_err(|e| PipelineError::Dataset(format!("cannot parse dataset: {}", e)))?;
        Ok(Self { sheets })
    }

    /// Insert or replace a sheet.
    pub fn insert_sheet(&mut self, name: impl Into<String>, content: Value) {
        self.sheets.insert(name.into(), content);
    }

    /// Get a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Value> {
        self.sheets.get(name)
    }

    /// Check if a sheet exists.
    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheets.contains_key(name)
    }

    /// Iterate over (name, content) pairs in sheet order.
    pub fn sheets(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.sheets.iter()
    }

    /// Number of sheets, including `updates` if present.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Apply the `updates` sheet onto its sibling sheets.
    ///
    /// Returns a new dataset; `self` is untouched. Each key of the
    /// `updates` object names a sheet whose content is deep-merged with
    /// the patch value. The `updates` sheet itself stays in the result,
    /// which makes re-application a visible no-op (idempotence).
    ///
    /// A dataset without an `updates` sheet is returned unchanged.
    pub fn apply_updates(&self) -> Self {
        let patches = match self.sheet(UPDATES_SHEET) {
            Some(Value::Object(patches)) => patches.clone(),
            _ => return self.clone(),
        };

        let mut merged = self.clone();
        for (sheet_name, patch) in &patches {
            let base = merged
                .sheets
                .get(sheet_name)
                .cloned()
                .unwrap_or(Value::Null);
            merged.sheets.insert(sheet_name.clone(), merge(&base, patch));
        }
        merged
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep, recursive key-wise merge of `patch` onto `base`.
///
/// For each key in `patch`: if both sides hold objects, recurse;
/// otherwise the patch value replaces the base value. Keys absent from
/// `patch` are untouched. Neither input is mutated; the result is a new
/// value. Idempotent: `merge(merge(b, p), p) == merge(b, p)`.
pub fn merge(base: &Value, patch: &Value) -> Value {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            let mut out = base_map.clone();
            for (key, patch_value) in patch_map {
                let next = match base_map.get(key) {
                    Some(base_value) => merge(base_value, patch_value),
                    None => patch_value.clone(),
                };
                out.insert(key.clone(), next);
            }
            Value::Object(out)
        }
        _ => patch.clone(),
    }
}
