use exif::{In, Reader, Tag};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Check whether a file already carries a usable capture date.
///
/// True only when an EXIF container parses and one of the date tags holds a
/// non-empty value. A missing, corrupt or unreadable container is the common
/// case for chat exports and reports false rather than an error. MP4 and
/// other non-EXIF containers fall out the same way.
pub fn has_capture_date(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut reader = BufReader::new(&file);
    let Ok(data) = Reader::new().read_from_container(&mut reader) else {
        return false;
    };

    let tags = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];

    tags.iter().any(|tag| {
        data.get_field(*tag, In::PRIMARY)
            .map(|field| !field.display_value().to_string().trim().is_empty())
            .unwrap_or(false)
    })
}
