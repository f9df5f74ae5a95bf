use std::path::{Path, PathBuf};

/// One candidate file discovered by the scanner.
///
/// Fields are fixed at discovery time. The derived date and the output path
/// flow through stage return values instead of being stored here, so nothing
/// is shared or mutated across files.
#[derive(Debug, Clone)]
pub struct MediaFile {
    /// Path as found under the input root
    pub source_path: PathBuf,
    /// Filename without extension
    pub base_name: String,
    /// Lower-cased extension including the dot (".jpg")
    pub extension: String,
}

impl MediaFile {
    /// Build a descriptor from a discovered path.
    /// Returns None when the path has no usable stem or extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let base_name = path.file_stem()?.to_str()?.to_string();
        let extension = format!(".{}", path.extension()?.to_str()?.to_lowercase());
        Some(Self {
            source_path: path.to_path_buf(),
            base_name,
            extension,
        })
    }

    /// Output filename: basename plus normalized extension.
    pub fn output_name(&self) -> String {
        format!("{}{}", self.base_name, self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_normalized() {
        let m = MediaFile::from_path(Path::new("/x/IMG_0001.JPG")).unwrap();
        assert_eq!(m.base_name, "IMG_0001");
        assert_eq!(m.extension, ".jpg");
        assert_eq!(m.output_name(), "IMG_0001.jpg");
    }

    #[test]
    fn test_no_extension_rejected() {
        assert!(MediaFile::from_path(Path::new("/x/README")).is_none());
    }
}
