use std::fs;
use std::path::{Path, PathBuf};

use crate::media::MediaFile;

/// Fatal scan error: the input root is missing or not a directory.
#[derive(Debug)]
pub struct InputRootError(pub PathBuf);

impl std::fmt::Display for InputRootError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "input path does not exist or is not a directory: {}",
            self.0.display()
        )
    }
}

impl std::error::Error for InputRootError {}

/// Result of scanning the input tree.
#[derive(Debug)]
pub struct ScanResult {
    /// Candidates in traversal order (entries sorted by name at each level)
    pub media: Vec<MediaFile>,
    /// Entries skipped due to filesystem errors during traversal
    pub warnings: Vec<String>,
}

/// Recursively collect media files under `root` whose extension is in the
/// allow-list (case-insensitive, given without the dot). Non-matching files
/// and directories are skipped silently; unreadable subtrees are skipped
/// with a warning and do not abort the scan.
pub fn collect_media(root: &Path, extensions: &[String]) -> anyhow::Result<ScanResult> {
    if !root.is_dir() {
        return Err(InputRootError(root.to_path_buf()).into());
    }

    let allowed: Vec<String> = extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_lowercase())
        .collect();

    let mut media = Vec::new();
    let mut warnings = Vec::new();
    collect_recursive(root, &allowed, &mut media, &mut warnings);

    Ok(ScanResult { media, warnings })
}

fn collect_recursive(
    dir: &Path,
    allowed: &[String],
    media: &mut Vec<MediaFile>,
    warnings: &mut Vec<String>,
) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warnings.push(format!("skipping {}: {}", dir.display(), e));
            return;
        }
    };

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => paths.push(entry.path()),
            Err(e) => warnings.push(format!("skipping entry under {}: {}", dir.display(), e)),
        }
    }
    // Sorted traversal keeps a rescan of the same tree in the same order
    paths.sort();

    for path in paths {
        if path.is_dir() {
            collect_recursive(&path, allowed, media, warnings);
        } else if has_allowed_extension(&path, allowed) {
            if let Some(m) = MediaFile::from_path(&path) {
                media.push(m);
            }
        }
    }
}

fn has_allowed_extension(path: &Path, allowed: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let ext = e.to_lowercase();
            allowed.iter().any(|a| *a == ext)
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap();
    }

    fn default_exts() -> Vec<String> {
        vec!["jpeg".to_string(), "jpg".to_string(), "mp4".to_string()]
    }

    #[test]
    fn test_collects_allowed_extensions_in_order() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("b/clip_20220101.mp4"));
        touch(&dir.path().join("a/IMG_20220115.jpg"));
        touch(&dir.path().join("a/notes.txt"));
        touch(&dir.path().join("IMG_0001.JPG"));

        let scan = collect_media(dir.path(), &default_exts()).unwrap();
        let names: Vec<String> = scan.media.iter().map(|m| m.output_name()).collect();
        assert_eq!(
            names,
            vec!["IMG_0001.jpg", "IMG_20220115.jpg", "clip_20220101.mp4"]
        );
        assert!(scan.warnings.is_empty());
    }

    #[test]
    fn test_rescan_is_deterministic() {
        let dir = tempdir().unwrap();
        for name in ["c_20220101.jpg", "a_20220101.jpg", "b_20220101.mp4"] {
            touch(&dir.path().join(name));
        }

        let first = collect_media(dir.path(), &default_exts()).unwrap();
        let second = collect_media(dir.path(), &default_exts()).unwrap();
        let order = |scan: &ScanResult| -> Vec<PathBuf> {
            scan.media.iter().map(|m| m.source_path.clone()).collect()
        };
        assert_eq!(order(&first), order(&second));
    }

    #[test]
    fn test_empty_root_yields_no_candidates() {
        let dir = tempdir().unwrap();
        let scan = collect_media(dir.path(), &default_exts()).unwrap();
        assert!(scan.media.is_empty());
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let err = collect_media(Path::new("/no/such/dir"), &default_exts()).unwrap_err();
        assert!(err.downcast_ref::<InputRootError>().is_some());
    }

    #[test]
    fn test_file_root_is_fatal() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("not_a_dir.jpg");
        touch(&file);
        assert!(collect_media(&file, &default_exts()).is_err());
    }
}
