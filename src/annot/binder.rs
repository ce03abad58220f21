// Annotation binding
// Associates each discovered file with zero-or-one annotation records

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::annot::formats::{self, AnnotError, AnnotScheme};
use crate::annot::types::Annotation;

/// Bind annotations to discovered files, returning one entry per file in
/// the same order.
///
/// - `annot_format` absent: every binding is `None`.
/// - Per-file scheme: resolves `<stem>.<ext>` next to each file; a missing
///   annotation source is fatal.
/// - Batch scheme (`annot_file` given): splits the file by embedded
///   identifier; identifiers with no matching discovered file are dropped
///   with a warning, and files with no entry bind `None`.
pub fn bind(
    files: &[PathBuf],
    annot_format: Option<&str>,
    annot_file: Option<&Path>,
) -> Result<Vec<Option<Annotation>>, AnnotError> {
    let format = match annot_format {
        Some(format) => format,
        None => return Ok(files.iter().map(|_| None).collect()),
    };

    match (formats::scheme_for(format)?, annot_file) {
        (AnnotScheme::PerFile { extension }, _) => bind_per_file(files, format, extension),
        (AnnotScheme::Batch, Some(annot_file)) => bind_batch(files, format, annot_file),
        (AnnotScheme::Batch, None) => Err(AnnotError::BatchFileRequired(format.to_string())),
    }
}

fn bind_per_file(
    files: &[PathBuf],
    format: &str,
    extension: &str,
) -> Result<Vec<Option<Annotation>>, AnnotError> {
    let mut bindings = Vec::with_capacity(files.len());

    for file in files {
        let annot_path = file.with_extension(extension);
        if !annot_path.is_file() {
            return Err(AnnotError::MissingAnnotation { path: file.clone() });
        }
        bindings.push(Some(formats::parse_per_file(format, &annot_path)?));
    }

    Ok(bindings)
}

fn bind_batch(
    files: &[PathBuf],
    format: &str,
    annot_file: &Path,
) -> Result<Vec<Option<Annotation>>, AnnotError> {
    let entries = formats::parse_batch(format, annot_file)?;

    let known_stems: Vec<Option<String>> = files.iter().map(|f| stem_of(f)).collect();

    // Key batch entries by identifier stem, dropping orphans
    let mut by_stem: BTreeMap<String, Annotation> = BTreeMap::new();
    for (identifier, annotation) in entries {
        match stem_of(Path::new(&identifier)) {
            Some(stem) if known_stems.iter().flatten().any(|s| *s == stem) => {
                by_stem.insert(stem, annotation);
            }
            _ => {
                log::warn!(
                    "dropping annotation for '{}': no matching file discovered",
                    identifier
                );
            }
        }
    }

    Ok(known_stems
        .into_iter()
        .map(|stem| stem.and_then(|s| by_stem.remove(&s)))
        .collect())
}

fn stem_of(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}
