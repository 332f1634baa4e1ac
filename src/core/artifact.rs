//! The intermediate content artifact handed between pipeline stages.

use indexmap::IndexMap;
use serde_json::Value;

/// Field that every artifact must carry, equal to the council area name.
pub const AREA_FIELD: &str = "area";

/// Expected number of fields in a complete content artifact.
///
/// The content builder's output contract: one field per report figure,
/// table or text fragment, plus the `area` field.
pub const CONTENT_FIELD_COUNT: usize = 430;

/// The per-area output of the content stage.
///
/// An ordered mapping of named report fields. Created by a stage-1
/// worker, persisted to the artifact store keyed by its area, consumed
/// and deleted by the matching stage-2 worker. Exactly one artifact per
/// council area; no two workers ever share a key.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ContentArtifact {
    fields: IndexMap<String, Value>,
}

impl ContentArtifact {
    /// Create an artifact for the given council area.
    ///
    /// The `area` field is set immediately and counts toward the field
    /// cardinality, as it does in the builder's output contract.
    pub fn new(area: impl Into<String>) -> Self {
        let mut fields = IndexMap::new();
        fields.insert(AREA_FIELD.to_string(), Value::String(area.into()));
        Self { fields }
    }

    /// Build an artifact directly from a field map.
    pub fn from_fields(fields: IndexMap<String, Value>) -> Self {
        Self { fields }
    }

    /// Set a named field.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    /// Get a named field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// The council area this artifact belongs to, if the `area` field is
    /// present and a string.
    pub fn area(&self) -> Option<&str> {
        self.fields.get(AREA_FIELD).and_then(|v| v.as_str())
    }

    /// Total number of fields, `area` included.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over (name, value) pairs in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }
}
