//! # Media Stamper
//!
//! Rewrite the metadata of uploaded photos and videos so every processed file
//! carries one fixed device fingerprint.
//!
//! This crate copies an upload to a fresh path, writes a configured metadata
//! record into the copy with `exiftool`, reads the critical tags back and fixes
//! them once if they did not stick.
//!
//! ## Key Features
//!
//! - **Field Routing**: Record fields with a native tag are written natively, everything else lands in a JSON blob under `XMP-dc:Description`.
//! - **Still Images and Videos**: EXIF tags for images, QuickTime `Keys` tags for video containers.
//! - **Critical Overrides**: Device identity and GPS are written literally and verified after the write.
//! - **Graceful Degradation**: Unsupported video tags are dropped in a single reduced retry; a failed tool run still leaves a usable copy.
//! - **Orientation Preservation**: The source's `Orientation` is carried over instead of the record's.
//! - **Upload Staging**: Unique upload names, processed-file naming and per-request capture timestamps.
//! - **Credentials**: A primary user store with a static admin fallback.
//!
//! ## Usage
//!
//! Build a `MediaStamper` once and call `stamp` for each upload.
//!
//! ```rust,no_run
//! use media_stamper::{MediaStamper, StampRequest};
//!
//! #[tokio::main]
//! async fn main() -> color_eyre::Result<()> {
//!     let stamper = MediaStamper::builder().build()?;
//!
//!     let request = StampRequest::builder()
//!         .source("uploads/photo.jpg")
//!         .destination("processed/photo-with-metadata.jpg")
//!         .build();
//!     let report = stamper.stamp(&request).await;
//!
//!     println!("{}", serde_json::to_string_pretty(&report)?);
//!     Ok(())
//! }
//! ```

pub mod auth;
mod error;
pub mod hashing;
pub mod invoke;
pub mod media;
pub mod plan;
pub mod record;
pub mod routing;
pub mod stamper;
pub mod staging;
pub mod utils;

pub use error::MediaStamperError;
pub use media::MediaKind;
pub use plan::{CommandPlan, WriteMode};
pub use record::MetadataRecord;
pub use record::trend::TREND_RECORD;
pub use routing::FieldMapping;
pub use stamper::report::{Classification, Stage, StampIssue, StampReport};
pub use stamper::{MediaStamper, StampRequest, StampSettings};
