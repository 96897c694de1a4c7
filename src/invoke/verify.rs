use crate::invoke::reader::TagReader;
use crate::media::MediaKind;
use crate::plan::critical::critical_fields;
use crate::record::MetadataRecord;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub tag: String,
    pub expected: String,
    pub found: Option<String>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.found {
            Some(found) => write!(f, "{}: expected {:?}, found {:?}", self.tag, self.expected, found),
            None => write!(f, "{}: expected {:?}, tag missing", self.tag, self.expected),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Matched,
    Mismatched(Vec<Mismatch>),
    /// The read-back itself failed; nothing is known about the file.
    Inconclusive(String),
}

/// Reads the critical tags of `kind` back from `path` and compares them,
/// string-exact, with the record.
///
/// Fields the record has no value for are not checked. The first read error
/// makes the whole verification inconclusive.
pub async fn verify<T: TagReader>(
    reader: &T,
    path: &Path,
    kind: MediaKind,
    record: &MetadataRecord,
) -> Verification {
    let mut mismatches = Vec::new();
    for field in critical_fields(kind) {
        let Some(expected) = record.text(field.record_key) else {
            continue;
        };
        let found = match reader.read_tag(path, field.read_tag).await {
            Ok(found) => found,
            Err(error) => {
                warn!(tag = field.read_tag, %error, "critical tag read-back failed");
                return Verification::Inconclusive(format!("reading {}: {error}", field.read_tag));
            }
        };
        if found.as_deref() != Some(expected.as_str()) {
            debug!(tag = field.read_tag, ?found, %expected, "critical tag mismatch");
            mismatches.push(Mismatch {
                tag: field.read_tag.to_string(),
                expected,
                found,
            });
        }
    }

    if mismatches.is_empty() {
        Verification::Matched
    } else {
        Verification::Mismatched(mismatches)
    }
}
