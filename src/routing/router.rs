use crate::record::{MetadataRecord, render_value};
use crate::routing::mapping::FieldMapping;
use serde_json::{Map, Value};

/// A record field that is written to its own native tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeField {
    pub key: String,
    pub tag: String,
    pub value: String,
}

/// The result of routing a record through a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedFields {
    /// Native tag writes, in mapping order.
    pub native: Vec<NativeField>,
    /// Record entries with no mapping row, in record order.
    pub residual: Map<String, Value>,
}

impl RoutedFields {
    /// The residual set as a single JSON object. Non-ASCII text is kept as UTF-8.
    pub fn residual_json(&self) -> String {
        Value::Object(self.residual.clone()).to_string()
    }

    pub fn native_keys(&self) -> impl Iterator<Item = &str> {
        self.native.iter().map(|field| field.key.as_str())
    }
}

/// Partitions `record` into native tag writes and the residual set.
///
/// A mapped key resolves to the mapping's literal when it has one and to the
/// record value otherwise. Keys that resolve to nothing are skipped, while an
/// empty string is still written. Every record key not named by the mapping
/// ends up in the residual set.
pub fn route(record: &MetadataRecord, mapping: &FieldMapping) -> RoutedFields {
    let native = mapping
        .entries()
        .iter()
        .filter_map(|entry| {
            let value = match &entry.literal {
                Some(literal) => render_value(literal),
                None => record.text(&entry.key),
            }?;
            Some(NativeField {
                key: entry.key.clone(),
                tag: entry.tag.clone(),
                value,
            })
        })
        .collect();

    let residual = record
        .iter()
        .filter(|(key, _)| !mapping.contains_key(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    RoutedFields { native, residual }
}
