// Dataset assembly
// Orchestrates discovery, annotation binding, filtering, and record building

use chrono::Utc;
use std::collections::BTreeSet;
use std::path::PathBuf;
use thiserror::Error;

use crate::annot::{self, AnnotError, AnnotScheme};
use crate::audio::{AudioError, SpectParams, SpectrogramError, SpectrogramGenerator};
use crate::dataset::builder;
use crate::dataset::discover::discover;
use crate::dataset::filter::{retain_labelset, Candidate};
use crate::dataset::model::{AudioFormat, DatasetMode, SpectFormat, VocalizationDataset};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("No files matching [{extensions}] found in {}", .dir.display())]
    NoFilesFound { dir: PathBuf, extensions: String },

    #[error("Every candidate was dropped; refusing to build an empty dataset")]
    EmptyDataset,

    #[error("Annotation error: {0}")]
    Annot(#[from] AnnotError),

    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Spectrogram error: {0}")]
    Spectrogram(#[from] SpectrogramError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the assembler needs to build one dataset
#[derive(Debug, Clone)]
pub struct AssembleRequest {
    pub data_dir: PathBuf,
    pub audio_format: Option<AudioFormat>,
    pub spect_format: Option<SpectFormat>,
    pub annot_format: Option<String>,
    pub annot_file: Option<PathBuf>,
    pub labelset: Option<BTreeSet<String>>,
    pub spect_params: Option<SpectParams>,
    pub compute_spectrograms: bool,
    /// Destination for derived spectrogram files
    pub output_dir: PathBuf,
}

/// Build an ordered dataset from a directory scan.
///
/// Preconditions are checked before any file I/O. Filtering runs strictly
/// before records are built, so a dropped candidate never triggers
/// spectrogram computation.
pub fn assemble(
    request: &AssembleRequest,
    generator: &dyn SpectrogramGenerator,
) -> Result<VocalizationDataset, DatasetError> {
    let mode = resolve_mode(request)?;
    let annot_scheme = check_annot_config(request)?;
    check_compute_config(request, mode)?;

    let files = discover(&request.data_dir, mode)?;

    let annotations = annot::bind(
        &files,
        request.annot_format.as_deref(),
        request.annot_file.as_deref(),
    )?;

    let mut candidates: Vec<Candidate> = files
        .into_iter()
        .zip(annotations)
        .map(|(path, annotation)| Candidate { path, annotation })
        .collect();

    // In the batch scheme an unmatched file has no annotation to train
    // against; drop it rather than keep an ambiguous record
    if annot_scheme == Some(AnnotScheme::Batch) {
        candidates.retain(|candidate| {
            if candidate.annotation.is_none() {
                log::warn!(
                    "dropping {}: no entry in annotation file",
                    candidate.path.display()
                );
                false
            } else {
                true
            }
        });
    }

    let candidates = retain_labelset(candidates, request.labelset.as_ref());

    if candidates.is_empty() {
        return Err(DatasetError::EmptyDataset);
    }

    let mut vocalizations = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        vocalizations.push(builder::build(
            candidate,
            mode,
            request.spect_params.as_ref(),
            request.compute_spectrograms,
            &request.output_dir,
            generator,
        )?);
    }

    log::info!("assembled dataset with {} vocalization(s)", vocalizations.len());

    Ok(VocalizationDataset {
        mode,
        annot_format: request.annot_format.clone(),
        labelset: request.labelset.clone(),
        spect_params: request.spect_params.clone(),
        prepared_at: Utc::now().to_rfc3339(),
        vocalizations,
    })
}

fn resolve_mode(request: &AssembleRequest) -> Result<DatasetMode, DatasetError> {
    match (request.audio_format, request.spect_format) {
        (Some(audio), None) => Ok(DatasetMode::Audio(audio)),
        (None, Some(spect)) => Ok(DatasetMode::Spectrogram(spect)),
        (Some(_), Some(_)) => Err(DatasetError::Configuration(
            "audio_format and spect_format are mutually exclusive".to_string(),
        )),
        (None, None) => Err(DatasetError::Configuration(
            "one of audio_format or spect_format is required".to_string(),
        )),
    }
}

fn check_annot_config(request: &AssembleRequest) -> Result<Option<AnnotScheme>, DatasetError> {
    let format = match &request.annot_format {
        Some(format) => format,
        None => {
            if request.annot_file.is_some() {
                return Err(DatasetError::Configuration(
                    "annot_file given without annot_format".to_string(),
                ));
            }
            return Ok(None);
        }
    };

    let scheme = annot::scheme_for(format)?;
    match scheme {
        AnnotScheme::PerFile { .. } if request.annot_file.is_some() => {
            Err(DatasetError::Configuration(format!(
                "format '{format}' uses one annotation file per recording; annot_file does not apply"
            )))
        }
        AnnotScheme::Batch if request.annot_file.is_none() => {
            Err(DatasetError::Configuration(format!(
                "format '{format}' requires annot_file"
            )))
        }
        _ => Ok(Some(scheme)),
    }
}

fn check_compute_config(request: &AssembleRequest, mode: DatasetMode) -> Result<(), DatasetError> {
    if !request.compute_spectrograms {
        return Ok(());
    }
    if matches!(mode, DatasetMode::Spectrogram(_)) {
        return Err(DatasetError::Configuration(
            "cannot compute spectrograms when spectrograms are the input".to_string(),
        ));
    }
    if request.spect_params.is_none() {
        return Err(DatasetError::Configuration(
            "compute_spectrograms requires spect_params".to_string(),
        ));
    }
    Ok(())
}
