// Manifest persistence
// Serializes a dataset to a portable JSON document and back

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::audio::SpectParams;
use crate::dataset::model::{
    AudioFormat, DatasetMode, SpectFormat, Vocalization, VocalizationDataset,
};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid manifest: {0}")]
    Invalid(String),

    #[error("Manifest references missing file: {}", .0.display())]
    DanglingReference(PathBuf),
}

/// On-disk manifest layout
///
/// The in-memory dataset models its mode as a single enum; the manifest
/// spells it out as two optional format fields, exactly one of which is
/// present. `load` re-checks that exclusivity so deserialization stays
/// symmetric with construction.
#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    metadata: Metadata,
    vocalizations: Vec<Vocalization>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_format: Option<AudioFormat>,

    #[serde(skip_serializing_if = "Option::is_none")]
    spect_format: Option<SpectFormat>,

    #[serde(skip_serializing_if = "Option::is_none")]
    annot_format: Option<String>,

    /// Ordered list; the in-memory set iterates sorted, so this is stable
    #[serde(skip_serializing_if = "Option::is_none")]
    labelset: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    spect_params: Option<SpectParams>,

    prepared_at: String,
}

/// Write the dataset to `destination` as pretty-printed JSON.
///
/// Referenced files are not re-validated here; see `load_strict` for the
/// reload-time check.
pub fn save(dataset: &VocalizationDataset, destination: &Path) -> Result<(), ManifestError> {
    let manifest = Manifest {
        metadata: Metadata {
            audio_format: dataset.mode.audio_format(),
            spect_format: dataset.mode.spect_format(),
            annot_format: dataset.annot_format.clone(),
            labelset: dataset
                .labelset
                .as_ref()
                .map(|set| set.iter().cloned().collect()),
            spect_params: dataset.spect_params.clone(),
            prepared_at: dataset.prepared_at.clone(),
        },
        vocalizations: dataset.vocalizations.clone(),
    };

    let file = File::create(destination)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &manifest)?;

    log::info!(
        "saved manifest with {} vocalization(s) to {}",
        dataset.len(),
        destination.display()
    );

    Ok(())
}

/// Load a dataset back from a manifest file.
///
/// The result has the same length, order, path values, annotations, and
/// metadata as the dataset that was saved.
pub fn load(source: &Path) -> Result<VocalizationDataset, ManifestError> {
    let file = File::open(source)?;
    let manifest: Manifest = serde_json::from_reader(BufReader::new(file))?;

    let mode = match (manifest.metadata.audio_format, manifest.metadata.spect_format) {
        (Some(audio), None) => DatasetMode::Audio(audio),
        (None, Some(spect)) => DatasetMode::Spectrogram(spect),
        (Some(_), Some(_)) => {
            return Err(ManifestError::Invalid(
                "both audio_format and spect_format present".to_string(),
            ));
        }
        (None, None) => {
            return Err(ManifestError::Invalid(
                "neither audio_format nor spect_format present".to_string(),
            ));
        }
    };

    let labelset: Option<BTreeSet<String>> = manifest
        .metadata
        .labelset
        .map(|labels| labels.into_iter().collect());

    Ok(VocalizationDataset {
        mode,
        annot_format: manifest.metadata.annot_format,
        labelset,
        spect_params: manifest.metadata.spect_params,
        prepared_at: manifest.metadata.prepared_at,
        vocalizations: manifest.vocalizations,
    })
}

/// Load a dataset and verify every referenced file still exists.
pub fn load_strict(source: &Path) -> Result<VocalizationDataset, ManifestError> {
    let dataset = load(source)?;

    for voc in dataset.iter() {
        for path in [voc.audio_path.as_deref(), voc.spect_path.as_deref()]
            .into_iter()
            .flatten()
        {
            if !path.is_file() {
                return Err(ManifestError::DanglingReference(path.to_path_buf()));
            }
        }
    }

    Ok(dataset)
}
