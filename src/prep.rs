// Dataset preparation entry point
// Assembles a dataset from a directory and optionally persists its manifest

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::audio::{SpectParams, StftGenerator};
use crate::dataset::{assemble, AssembleRequest, DatasetError, ManifestError};
use crate::dataset::manifest;
use crate::dataset::model::{AudioFormat, SpectFormat, VocalizationDataset};

#[derive(Debug, Error)]
pub enum PrepError {
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Inputs for one preparation run
#[derive(Debug, Clone)]
pub struct PrepConfig {
    /// Directory scanned for recordings or spectrogram files
    pub data_dir: PathBuf,

    /// Exactly one of `audio_format` / `spect_format` must be set
    pub audio_format: Option<AudioFormat>,
    pub spect_format: Option<SpectFormat>,

    pub annot_format: Option<String>,
    pub annot_file: Option<PathBuf>,
    pub labelset: Option<BTreeSet<String>>,

    /// Destination for derived spectrograms and the manifest
    pub output_dir: PathBuf,
    pub save_manifest: bool,
    pub manifest_filename: String,

    pub spect_params: Option<SpectParams>,
    pub compute_spectrograms: bool,
}

impl Default for PrepConfig {
    fn default() -> Self {
        PrepConfig {
            data_dir: PathBuf::new(),
            audio_format: None,
            spect_format: None,
            annot_format: None,
            annot_file: None,
            labelset: None,
            output_dir: PathBuf::new(),
            save_manifest: true,
            manifest_filename: "dataset.json".to_string(),
            spect_params: None,
            compute_spectrograms: false,
        }
    }
}

/// Prepare a dataset from a directory of recordings or spectrograms.
///
/// Returns the assembled dataset and, when `save_manifest` is set, the path
/// of the written manifest.
pub fn prep(config: &PrepConfig) -> Result<(VocalizationDataset, Option<PathBuf>), PrepError> {
    let request = AssembleRequest {
        data_dir: config.data_dir.clone(),
        audio_format: config.audio_format,
        spect_format: config.spect_format,
        annot_format: config.annot_format.clone(),
        annot_file: config.annot_file.clone(),
        labelset: config.labelset.clone(),
        spect_params: config.spect_params.clone(),
        compute_spectrograms: config.compute_spectrograms,
        output_dir: config.output_dir.clone(),
    };

    fs::create_dir_all(&config.output_dir)?;

    let dataset = assemble(&request, &StftGenerator)?;

    let manifest_path = if config.save_manifest {
        let path = config.output_dir.join(&config.manifest_filename);
        manifest::save(&dataset, &path)?;
        Some(path)
    } else {
        None
    };

    Ok((dataset, manifest_path))
}
