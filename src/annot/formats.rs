// Annotation format registry and parsers
// Each format is keyed by a name string and produces the uniform Annotation record

use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::annot::types::{Annotation, Segment};

#[derive(Debug, Error)]
pub enum AnnotError {
    #[error("Unknown annotation format: {0}")]
    UnknownFormat(String),

    #[error("No annotation found for {}", .path.display())]
    MissingAnnotation { path: PathBuf },

    #[error("Annotation format '{0}' requires a batch annotation file")]
    BatchFileRequired(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse annotation table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse annotation file: {0}")]
    Json(#[from] serde_json::Error),
}

/// How a format maps annotation sources to recordings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotScheme {
    /// One annotation file per recording, resolved by filename stem
    PerFile { extension: &'static str },

    /// One annotation file covering many recordings, keyed by embedded identifier
    Batch,
}

/// Look up the scheme for a format name
pub fn scheme_for(format: &str) -> Result<AnnotScheme, AnnotError> {
    match format {
        "csv" => Ok(AnnotScheme::PerFile { extension: "csv" }),
        "batch-json" => Ok(AnnotScheme::Batch),
        other => Err(AnnotError::UnknownFormat(other.to_string())),
    }
}

/// Parse one per-file annotation source
pub fn parse_per_file(format: &str, path: &Path) -> Result<Annotation, AnnotError> {
    match format {
        "csv" => parse_csv(path),
        other => Err(AnnotError::UnknownFormat(other.to_string())),
    }
}

/// Parse a batch annotation file into (identifier, annotation) records
///
/// The identifier is whatever name the file embeds for each recording;
/// callers match it against discovered files by stem.
pub fn parse_batch(format: &str, path: &Path) -> Result<Vec<(String, Annotation)>, AnnotError> {
    match format {
        "batch-json" => parse_batch_json(path),
        other => Err(AnnotError::UnknownFormat(other.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    onset_s: f64,
    offset_s: f64,
    label: String,
}

/// CSV layout: header `onset_s,offset_s,label`, one row per segment
fn parse_csv(path: &Path) -> Result<Annotation, AnnotError> {
    let mut reader = csv::Reader::from_path(path)?;

    let mut segments = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        segments.push(Segment {
            onset_s: row.onset_s,
            offset_s: row.offset_s,
            label: row.label,
        });
    }

    Ok(Annotation::new(segments))
}

#[derive(Debug, Deserialize)]
struct BatchEntry {
    audio_file: String,
    segments: Vec<Segment>,
}

/// Batch JSON layout: `[{ "audio_file": "...", "segments": [...] }, ...]`
fn parse_batch_json(path: &Path) -> Result<Vec<(String, Annotation)>, AnnotError> {
    let file = File::open(path)?;
    let entries: Vec<BatchEntry> = serde_json::from_reader(BufReader::new(file))?;

    Ok(entries
        .into_iter()
        .map(|e| (e.audio_file, Annotation::new(e.segments)))
        .collect())
}
