//! Splits a metadata record into native tag writes and a residual JSON blob.
pub mod mapping;
pub mod router;

pub use mapping::{FieldMapping, TagMapping};
pub use router::{NativeField, RoutedFields, route};
