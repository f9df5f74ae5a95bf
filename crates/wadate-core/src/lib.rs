pub mod date;
pub mod media;
pub mod scan;
pub mod writer;

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use anyhow::Context;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::media::MediaFile;

pub use scan::InputRootError;

fn default_extensions() -> Vec<String> {
    vec!["jpeg".to_string(), "jpg".to_string(), "mp4".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessOptions {
    /// Root directory to scan
    pub input: PathBuf,
    /// Directory receiving the rewritten copies
    pub output: PathBuf,
    /// Replace files already present in the output directory
    #[serde(default)]
    pub overwrite: bool,
    /// Allowed extensions, case-insensitive, without the dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl ProcessOptions {
    pub fn new(input: PathBuf, output: PathBuf) -> Self {
        Self {
            input,
            output,
            overwrite: false,
            extensions: default_extensions(),
        }
    }
}

/// Terminal classification of one candidate file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// New copy written, capture date attached
    Processed { output: PathBuf },
    /// File already carries a non-empty capture date
    SkippedHasMetadata,
    /// Filename holds no YYYYMMDD run
    SkippedNoDateMatch,
    /// Output path occupied under the non-overwrite policy
    SkippedExists,
    /// Per-file error; the batch continues
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessResult {
    /// One entry per candidate, in collection order
    pub outcomes: Vec<FileOutcome>,
    pub processed: u64,
    pub skipped_has_metadata: u64,
    pub skipped_no_date_match: u64,
    pub skipped_exists: u64,
    pub failed: u64,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Type alias for progress callback
pub type ProgressCallback = dyn Fn(&str, u64, u64, &str) + Send + Sync;

/// Throttled progress reporter, emits at most every 200ms or on completion.
pub struct ThrottledProgress<'a> {
    inner: &'a ProgressCallback,
    last_emit: std::sync::Mutex<Instant>,
}

impl<'a> ThrottledProgress<'a> {
    pub fn new(inner: &'a ProgressCallback) -> Self {
        Self {
            inner,
            last_emit: std::sync::Mutex::new(Instant::now() - std::time::Duration::from_secs(1)),
        }
    }

    pub fn report(&self, stage: &str, current: u64, total: u64, message: &str) {
        let is_done = current + 1 >= total;
        if !is_done {
            let mut last = self.last_emit.lock().unwrap();
            if last.elapsed().as_millis() < 200 {
                return;
            }
            *last = Instant::now();
        }
        (self.inner)(stage, current, total, message);
    }
}

/// Run the full pipeline: collect candidates, then drive each one through
/// inspect, derive and write, classifying the result per file.
///
/// Only two conditions abort the run: an invalid input root and an
/// uncreatable output directory. Everything else becomes a per-file outcome.
pub fn process(
    options: &ProcessOptions,
    progress_callback: &ProgressCallback,
) -> anyhow::Result<ProcessResult> {
    let tp = ThrottledProgress::new(progress_callback);

    // Stage 1: collect candidates
    let scan = scan::collect_media(&options.input, &options.extensions)?;
    let media = scan.media;
    let mut warnings = scan.warnings;
    let total = media.len() as u64;
    tp.report("scan", total, total, "Candidates collected");

    if media.is_empty() {
        return Ok(ProcessResult {
            warnings,
            ..Default::default()
        });
    }

    fs::create_dir_all(&options.output)
        .with_context(|| format!("creating output directory {}", options.output.display()))?;

    // Assign output names up front. Candidates with colliding basenames
    // from different subtrees would otherwise target one path from parallel
    // workers; duplicates run in a sequential pass afterwards.
    let mut claimed: HashSet<String> = HashSet::with_capacity(media.len());
    let mut duplicate: Vec<bool> = Vec::with_capacity(media.len());
    for m in &media {
        let first = claimed.insert(m.output_name());
        if !first {
            warnings.push(format!(
                "duplicate basename {}: {} written after the parallel pass",
                m.output_name(),
                m.source_path.display()
            ));
        }
        duplicate.push(!first);
    }

    // Stage 2: per-file pipeline
    let counter = AtomicU64::new(0);
    let run_one = |m: &MediaFile| -> Outcome {
        let outcome = process_one(m, options).unwrap_or_else(|e| Outcome::Failed {
            reason: format!("{:#}", e),
        });
        let current = counter.fetch_add(1, Ordering::Relaxed);
        tp.report("process", current, total, &m.output_name());
        outcome
    };

    let mut slots: Vec<Option<Outcome>> = vec![None; media.len()];
    let unique: Vec<(usize, Outcome)> = media
        .par_iter()
        .enumerate()
        .filter(|(i, _)| !duplicate[*i])
        .map(|(i, m)| (i, run_one(m)))
        .collect();
    for (i, outcome) in unique {
        slots[i] = Some(outcome);
    }
    for (i, m) in media.iter().enumerate() {
        if duplicate[i] {
            slots[i] = Some(run_one(m));
        }
    }

    let outcomes: Vec<FileOutcome> = media
        .iter()
        .zip(slots)
        .map(|(m, outcome)| FileOutcome {
            source: m.source_path.clone(),
            outcome: outcome.expect("every candidate is classified"),
        })
        .collect();

    let mut result = ProcessResult {
        warnings,
        ..Default::default()
    };
    for fo in &outcomes {
        match fo.outcome {
            Outcome::Processed { .. } => result.processed += 1,
            Outcome::SkippedHasMetadata => result.skipped_has_metadata += 1,
            Outcome::SkippedNoDateMatch => result.skipped_no_date_match += 1,
            Outcome::SkippedExists => result.skipped_exists += 1,
            Outcome::Failed { .. } => result.failed += 1,
        }
    }
    result.outcomes = outcomes;

    Ok(result)
}

/// Drive one file through inspect, derive, write. Errors are returned to the
/// caller, which folds them into a per-file outcome.
fn process_one(media: &MediaFile, options: &ProcessOptions) -> anyhow::Result<Outcome> {
    if date::exif::has_capture_date(&media.source_path) {
        return Ok(Outcome::SkippedHasMetadata);
    }

    let Some(derived_date) = date::filename::derive_date(&media.base_name) else {
        return Ok(Outcome::SkippedNoDateMatch);
    };

    match writer::write_media(media, &derived_date, &options.output, options.overwrite)? {
        writer::WriteOutcome::Written(output) => Ok(Outcome::Processed { output }),
        writer::WriteOutcome::Exists => Ok(Outcome::SkippedExists),
    }
}
