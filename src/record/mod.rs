//! The metadata record: an ordered, read-only set of named attributes that
//! describes the fingerprint written into every processed file.
pub mod error;
pub mod trend;

use crate::record::error::RecordError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// An ordered mapping from key to a JSON-compatible value.
///
/// Records are built once and then only read. Per-request values such as
/// timestamps are layered on with [`MetadataRecord::overlay`], which returns a
/// new record and leaves the base untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataRecord {
    fields: Map<String, Value>,
}

impl MetadataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a record from a JSON object, keeping the key order of the source text.
    pub fn from_json_str(text: &str) -> Result<Self, RecordError> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(RecordError::NotAnObject(json_kind(&other))),
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, RecordError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Adds or replaces a field, consuming and returning the record.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Returns a new record with `overlay` applied on top of `self`.
    ///
    /// Keys already present keep their position and take the overlay value,
    /// new keys are appended in overlay order.
    #[must_use]
    pub fn overlay(&self, overlay: &Self) -> Self {
        let mut fields = self.fields.clone();
        for (key, value) in &overlay.fields {
            fields.insert(key.clone(), value.clone());
        }
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The textual form of a field as it is handed to the metadata tool.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(render_value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, Value)> for MetadataRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Renders a value the way it is written on the tool's command line.
///
/// `null` counts as absent. Strings are used verbatim, numbers and booleans
/// use their JSON text, nested values become compact JSON.
pub fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
