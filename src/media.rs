use mime_guess::MimeGuess;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Whether a file is a still image or a video container. The kind picks the
/// tag namespace and the argument set used to rewrite it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaKind {
    StillImage,
    VideoContainer,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaKindError {
    #[error("Unsupported media type {mime} for {path}")]
    Unsupported { path: String, mime: String },
}

impl MediaKind {
    /// Guesses the kind from the file extension.
    pub fn detect(path: &Path) -> Result<Self, MediaKindError> {
        let mime = MimeGuess::from_path(path).first_or_octet_stream();
        match mime.type_().as_str() {
            "image" => Ok(Self::StillImage),
            "video" => Ok(Self::VideoContainer),
            _ => Err(MediaKindError::Unsupported {
                path: path.display().to_string(),
                mime: mime.to_string(),
            }),
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StillImage => f.write_str("still image"),
            Self::VideoContainer => f.write_str("video container"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(
            MediaKind::detect(Path::new("a/photo.jpg")),
            Ok(MediaKind::StillImage)
        );
        assert_eq!(
            MediaKind::detect(Path::new("photo.PNG")),
            Ok(MediaKind::StillImage)
        );
        assert_eq!(
            MediaKind::detect(Path::new("clip.mp4")),
            Ok(MediaKind::VideoContainer)
        );
        assert_eq!(
            MediaKind::detect(Path::new("clip.mov")),
            Ok(MediaKind::VideoContainer)
        );
    }

    #[test]
    fn test_detect_rejects_other_types() {
        let result = MediaKind::detect(Path::new("notes.txt"));
        assert!(matches!(result, Err(MediaKindError::Unsupported { mime, .. }) if mime == "text/plain"));
        assert!(MediaKind::detect(Path::new("no_extension")).is_err());
    }
}
