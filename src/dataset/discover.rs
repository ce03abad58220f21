// File discovery
// Deterministic directory scan for files matching the dataset mode

use std::fs;
use std::path::{Path, PathBuf};

use crate::dataset::assemble::DatasetError;
use crate::dataset::model::DatasetMode;

/// Enumerate the files in `data_dir` matching the mode's format family.
///
/// Results are sorted by filename so repeated runs over the same directory
/// always produce the same order. Zero matches is a hard error; an empty
/// dataset is never valid output.
pub fn discover(data_dir: &Path, mode: DatasetMode) -> Result<Vec<PathBuf>, DatasetError> {
    let extensions = mode.extensions();

    let mut matched = Vec::new();
    for entry in fs::read_dir(data_dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| extensions.iter().any(|known| ext.eq_ignore_ascii_case(known)))
            .unwrap_or(false);
        if matches {
            matched.push(path);
        }
    }

    if matched.is_empty() {
        return Err(DatasetError::NoFilesFound {
            dir: data_dir.to_path_buf(),
            extensions: extensions.join(", "),
        });
    }

    matched.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    log::info!(
        "discovered {} file(s) in {}",
        matched.len(),
        data_dir.display()
    );

    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::model::{AudioFormat, SpectFormat};
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_discover_sorted_by_filename() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        touch(dir, "c.wav");
        touch(dir, "a.wav");
        touch(dir, "b.wav");

        let files = discover(dir, DatasetMode::Audio(AudioFormat::Wav)).unwrap();

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.wav", "b.wav", "c.wav"]);
    }

    #[test]
    fn test_discover_filters_by_format_family() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        touch(dir, "a.wav");
        touch(dir, "notes.txt");
        touch(dir, "spect.json");

        let files = discover(dir, DatasetMode::Audio(AudioFormat::Wav)).unwrap();
        assert_eq!(files.len(), 1);

        let files = discover(dir, DatasetMode::Spectrogram(SpectFormat::Json)).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("spect.json"));
    }

    #[test]
    fn test_discover_zero_matches_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "notes.txt");

        let result = discover(temp_dir.path(), DatasetMode::Audio(AudioFormat::Wav));

        assert!(matches!(result, Err(DatasetError::NoFilesFound { .. })));
    }

    #[test]
    fn test_discover_missing_dir_is_io_error() {
        let result = discover(
            Path::new("/nonexistent/dir"),
            DatasetMode::Audio(AudioFormat::Wav),
        );

        assert!(matches!(result, Err(DatasetError::Io(_))));
    }
}
