use crate::media::MediaKind;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|s| s.starts_with('.'))
}

/// Recursively lists the photos and videos under `dir`. Entries within each
/// directory are visited in file-name order.
///
/// Files whose extension is neither an image nor a video type are left out.
/// I/O errors met while walking are returned.
pub fn list_media_files(dir: &Path, include_hidden: bool) -> Result<Vec<PathBuf>, walkdir::Error> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| include_hidden || !is_hidden(entry))
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => {
                MediaKind::detect(entry.path()).is_ok().then(|| Ok(entry.into_path()))
            }
            Ok(_) => None,
            Err(error) => Some(Err(error)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_lists_only_visible_media() {
        let dir = tempfile::tempdir().expect("temp dir");
        let root = dir.path();
        fs::create_dir_all(root.join("nested")).expect("nested dir");
        fs::create_dir_all(root.join(".cache")).expect("hidden dir");
        for name in ["a.jpg", "nested/b.mp4", "notes.txt", ".hidden.jpg", ".cache/c.jpg"] {
            fs::write(root.join(name), b"x").expect("write fixture");
        }

        let files = list_media_files(root, false).expect("walk");
        assert_eq!(files, vec![root.join("a.jpg"), root.join("nested/b.mp4")]);

        let all = list_media_files(root, true).expect("walk");
        assert_eq!(all.len(), 4);
    }
}
