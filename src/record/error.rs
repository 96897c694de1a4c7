use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Metadata record must be a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("Failed to parse metadata record: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read metadata record: {0}")]
    Io(#[from] std::io::Error),
}
