use crate::invoke::error::ReadError;
use crate::record::render_value;
use exiftool::{ExifTool, ExifToolError};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;

/// Reads the current value of a single tag from a file.
pub trait TagReader: Send + Sync {
    /// `Ok(None)` means the file has no such tag.
    fn read_tag(
        &self,
        path: &Path,
        tag: &str,
    ) -> impl Future<Output = Result<Option<String>, ReadError>> + Send;
}

/// [`TagReader`] over a shared stay-open `exiftool` process.
///
/// Values come back print-converted, so GPS reads as
/// `22 deg 58' 46.24" S` rather than decimal degrees. `ExifTool` serialises
/// requests to its process internally, so clones share one process.
#[derive(Debug, Clone)]
pub struct ExifToolReader {
    exiftool: Arc<ExifTool>,
}

impl ExifToolReader {
    pub fn new() -> Result<Self, ExifToolError> {
        Ok(Self::from_exiftool(ExifTool::new()?))
    }

    pub fn with_executable(exiftool_path: &Path) -> Result<Self, ExifToolError> {
        Ok(Self::from_exiftool(ExifTool::with_executable(exiftool_path)?))
    }

    pub fn from_exiftool(exiftool: ExifTool) -> Self {
        Self {
            exiftool: Arc::new(exiftool),
        }
    }
}

impl TagReader for ExifToolReader {
    async fn read_tag(&self, path: &Path, tag: &str) -> Result<Option<String>, ReadError> {
        let exiftool = Arc::clone(&self.exiftool);
        let path = path.to_path_buf();
        let tag = tag.to_string();
        tokio::task::spawn_blocking(move || match exiftool.json_tag(&path, &tag, &[]) {
            Ok(value) => Ok(render_value(&value)),
            Err(ExifToolError::TagNotFound { .. }) => Ok(None),
            Err(error) => Err(ReadError::Exiftool(error)),
        })
        .await?
    }
}
