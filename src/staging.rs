//! Saving uploads to unique paths and naming their processed copies.
use crate::record::MetadataRecord;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

const EXIF_DATE_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("Upload name {0:?} has no usable file name")]
    InvalidName(String),

    #[error("I/O error while staging upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload was not found at {} after saving", .0.display())]
    Missing(PathBuf),
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

/// `<owner>-<timestamp with millis>-<sanitized original name>`.
///
/// Two uploads by the same owner in the same millisecond collide; anything
/// finer is left to the caller.
pub fn upload_file_name(
    owner: &str,
    original_name: &str,
    now: DateTime<Utc>,
) -> Result<String, StagingError> {
    let file_name = Path::new(original_name)
        .file_name()
        .map(|name| sanitize(&name.to_string_lossy()))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| StagingError::InvalidName(original_name.to_string()))?;
    let owner = match sanitize(owner) {
        owner if owner.is_empty() => "anonymous".to_string(),
        owner => owner,
    };
    Ok(format!(
        "{owner}-{}-{file_name}",
        now.format("%Y%m%d%H%M%S%3f")
    ))
}

/// Writes an upload under `dir` and returns its path once it exists on disk.
pub async fn stage_upload(
    dir: &Path,
    owner: &str,
    original_name: &str,
    bytes: &[u8],
    now: DateTime<Utc>,
) -> Result<PathBuf, StagingError> {
    let path = dir.join(upload_file_name(owner, original_name, now)?);
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&path, bytes).await?;
    if !tokio::fs::try_exists(&path).await? {
        return Err(StagingError::Missing(path));
    }
    Ok(path)
}

/// `<stem>-with-metadata<.ext>`; uploads without an extension become `.heic`.
pub fn processed_name(upload: &Path) -> String {
    let stem = upload
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = upload
        .extension()
        .map_or_else(|| "heic".to_string(), |ext| ext.to_string_lossy().into_owned());
    format!("{stem}-with-metadata.{extension}")
}

pub fn processed_path(dir: &Path, upload: &Path) -> PathBuf {
    dir.join(processed_name(upload))
}

/// A fresh uppercase v4 UUID, in the form the record's identifiers use.
pub fn new_identifier() -> String {
    Uuid::new_v4().to_string().to_uppercase()
}

/// The per-request overlay: capture timestamps and a content identifier.
pub fn capture_overlay(now: DateTime<Utc>, identifier: &str) -> MetadataRecord {
    let stamp = now.format(EXIF_DATE_FORMAT).to_string();
    MetadataRecord::new()
        .with("date_time_original", stamp.clone())
        .with("create_date", stamp.clone())
        .with("modify_date", stamp)
        .with("content_identifier", identifier)
}
