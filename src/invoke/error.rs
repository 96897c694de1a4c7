use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Exiftool failed to read the file")]
    Exiftool(#[from] exiftool::ExifToolError),

    #[error("Tag read task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
