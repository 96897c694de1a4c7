use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

/// BLAKE3 digest of a file, hex encoded.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut hasher = blake3::Hasher::new();
    hasher.update_mmap_rayon(path)?;
    Ok(hasher.finalize().to_hex().to_string())
}

/// Hashes a finished file off the async runtime. A failure only costs the
/// digest, so it is logged and dropped.
pub async fn digest_file(path: &Path) -> Option<String> {
    let owned: PathBuf = path.to_path_buf();
    match tokio::task::spawn_blocking(move || hash_file(&owned)).await {
        Ok(Ok(digest)) => Some(digest),
        Ok(Err(error)) => {
            warn!(path = %path.display(), %error, "could not hash output");
            None
        }
        Err(error) => {
            warn!(%error, "hash task failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_digest_matches_blake3_of_contents() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"stamped bytes").expect("write");

        let digest = digest_file(file.path()).await;

        assert_eq!(digest, Some(blake3::hash(b"stamped bytes").to_hex().to_string()));
    }

    #[tokio::test]
    async fn test_missing_file_has_no_digest() {
        let digest = digest_file(Path::new("does/not/exist.jpg")).await;
        assert_eq!(digest, None);
    }
}
