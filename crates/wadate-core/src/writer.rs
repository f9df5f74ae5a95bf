use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use little_exif::exif_tag::ExifTag;
use little_exif::metadata::Metadata;

use crate::media::MediaFile;

/// Result of one write attempt.
pub enum WriteOutcome {
    /// New file written at the contained path
    Written(PathBuf),
    /// Output path already occupied under the non-overwrite policy
    Exists,
}

/// Write a copy of `media` into `output_dir` carrying `derived_date` as its
/// capture date. The source file is never modified or deleted.
///
/// Without `overwrite` the output is created with an exclusive open, so an
/// occupied path is detected atomically and reported as a skip instead of
/// racing a concurrent writer.
pub fn write_media(
    media: &MediaFile,
    derived_date: &str,
    output_dir: &Path,
    overwrite: bool,
) -> anyhow::Result<WriteOutcome> {
    let output_path = output_dir.join(media.output_name());

    let payload = fs::read(&media.source_path)
        .with_context(|| format!("reading {}", media.source_path.display()))?;

    let file = if overwrite {
        File::create(&output_path)
            .with_context(|| format!("creating {}", output_path.display()))?
    } else {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&output_path)
        {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(WriteOutcome::Exists),
            Err(e) => {
                return Err(e).with_context(|| format!("creating {}", output_path.display()))
            }
        }
    };

    let mut out = io::BufWriter::new(file);
    if let Err(e) = out.write_all(&payload).and_then(|_| out.flush()) {
        fs::remove_file(&output_path).ok();
        return Err(e).with_context(|| format!("writing {}", output_path.display()));
    }
    drop(out);

    // Images get a fresh metadata block. MP4 has no supported metadata
    // writer, so the payload copy stands as-is.
    if is_image(media) {
        if let Err(e) = embed_capture_date(&output_path, derived_date) {
            fs::remove_file(&output_path).ok();
            return Err(e);
        }
    }

    stamp_mtime(&output_path, derived_date);

    Ok(WriteOutcome::Written(output_path))
}

fn is_image(media: &MediaFile) -> bool {
    mime_guess::from_path(&media.source_path)
        .first()
        .map_or(false, |mime| mime.type_() == mime_guess::mime::IMAGE)
}

/// Build a new EXIF block with both date fields set and splice it into the
/// written file. Fails when the payload is not a decodable image container.
fn embed_capture_date(output_path: &Path, derived_date: &str) -> anyhow::Result<()> {
    let mut metadata = Metadata::new();
    metadata.set_tag(ExifTag::DateTimeOriginal(derived_date.to_string()));
    metadata.set_tag(ExifTag::CreateDate(derived_date.to_string()));
    metadata.write_to_file(output_path).map_err(|e| {
        anyhow::anyhow!(
            "embedding capture date into {}: {}",
            output_path.display(),
            e
        )
    })
}

/// Mirror the derived date onto the output mtime. Dates taken verbatim from
/// filenames may not be real calendar dates; those keep the current mtime.
fn stamp_mtime(path: &Path, derived_date: &str) {
    let Ok(date) = NaiveDate::parse_from_str(derived_date, "%Y-%m-%d") else {
        return;
    };
    let Some(dt) = date.and_hms_opt(0, 0, 0) else {
        return;
    };
    if let Some(local) = dt.and_local_timezone(chrono::Local).single() {
        let ft = filetime::FileTime::from_unix_time(local.timestamp(), 0);
        filetime::set_file_mtime(path, ft).ok();
    }
}
