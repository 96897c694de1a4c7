use thiserror::Error;

/// The primary error type for the media-stamper crate.
///
/// Stamping an upload never returns this; pipeline problems are reported in
/// [`crate::StampReport`]. These are setup and staging errors.
#[derive(Error, Debug)]
pub enum MediaStamperError {
    #[error("Exiftool failed to start")]
    Exiftool(#[from] exiftool::ExifToolError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Staging the upload failed: {0}")]
    Staging(#[from] crate::staging::StagingError),
}
