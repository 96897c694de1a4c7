use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Failed to read user file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse user file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Password digest for {username} is not valid hex")]
    InvalidDigest {
        username: String,
        #[source]
        source: blake3::HexError,
    },
}
