// Dataset data model
// Vocalization records, the assembled dataset, and its mode/format tags

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::str::FromStr;

use crate::annot::Annotation;
use crate::audio::SpectParams;

/// Audio file formats the pipeline can discover and decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
}

impl AudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
        }
    }

    /// File extensions belonging to this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            AudioFormat::Wav => &["wav"],
        }
    }
}

impl FromStr for AudioFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wav" => Ok(AudioFormat::Wav),
            other => Err(format!("unknown audio format: {other}")),
        }
    }
}

/// Spectrogram file formats the pipeline can discover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectFormat {
    Json,
}

impl SpectFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpectFormat::Json => "json",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            SpectFormat::Json => &["json"],
        }
    }
}

impl FromStr for SpectFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(SpectFormat::Json),
            other => Err(format!("unknown spectrogram format: {other}")),
        }
    }
}

/// Which kind of source files a dataset is built from
///
/// Audio mode and spectrogram mode are mutually exclusive by construction;
/// there is no way to represent a dataset with both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetMode {
    Audio(AudioFormat),
    Spectrogram(SpectFormat),
}

impl DatasetMode {
    pub fn audio_format(&self) -> Option<AudioFormat> {
        match self {
            DatasetMode::Audio(format) => Some(*format),
            DatasetMode::Spectrogram(_) => None,
        }
    }

    pub fn spect_format(&self) -> Option<SpectFormat> {
        match self {
            DatasetMode::Audio(_) => None,
            DatasetMode::Spectrogram(format) => Some(*format),
        }
    }

    /// File extensions matched during discovery for this mode
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            DatasetMode::Audio(format) => format.extensions(),
            DatasetMode::Spectrogram(format) => format.extensions(),
        }
    }
}

/// One recording/spectrogram unit of the dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocalization {
    /// Source recording; present iff the dataset is in audio mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<PathBuf>,

    /// Spectrogram file, pre-supplied or derived from the recording
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spect_path: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,

    /// Parameters for the spectrogram transform; absent when the
    /// spectrogram was produced elsewhere
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spect_params: Option<SpectParams>,
}

/// An ordered, immutable dataset of vocalizations
///
/// Iteration order equals discovery order (filename-sorted) and is never
/// reordered after assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct VocalizationDataset {
    pub mode: DatasetMode,
    pub annot_format: Option<String>,
    pub labelset: Option<BTreeSet<String>>,
    pub spect_params: Option<SpectParams>,
    /// RFC 3339 stamp taken when the dataset was assembled
    pub prepared_at: String,
    pub vocalizations: Vec<Vocalization>,
}

impl VocalizationDataset {
    pub fn len(&self) -> usize {
        self.vocalizations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocalizations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vocalization> {
        self.vocalizations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tag_round_trip() {
        assert_eq!("wav".parse::<AudioFormat>().unwrap(), AudioFormat::Wav);
        assert_eq!(AudioFormat::Wav.as_str(), "wav");
        assert_eq!("json".parse::<SpectFormat>().unwrap(), SpectFormat::Json);
        assert!("cbin".parse::<AudioFormat>().is_err());
    }

    #[test]
    fn test_format_serde_tags_are_lowercase() {
        let json = serde_json::to_string(&AudioFormat::Wav).unwrap();
        assert_eq!(json, "\"wav\"");
        let json = serde_json::to_string(&SpectFormat::Json).unwrap();
        assert_eq!(json, "\"json\"");
    }

    #[test]
    fn test_mode_exposes_exactly_one_format() {
        let audio = DatasetMode::Audio(AudioFormat::Wav);
        assert_eq!(audio.audio_format(), Some(AudioFormat::Wav));
        assert_eq!(audio.spect_format(), None);

        let spect = DatasetMode::Spectrogram(SpectFormat::Json);
        assert_eq!(spect.audio_format(), None);
        assert_eq!(spect.spect_format(), Some(SpectFormat::Json));
    }

    #[test]
    fn test_vocalization_serde_omits_absent_fields() {
        let voc = Vocalization {
            audio_path: Some(PathBuf::from("/data/a.wav")),
            spect_path: None,
            annotation: None,
            spect_params: None,
        };

        let json = serde_json::to_string(&voc).unwrap();
        assert!(json.contains("audio_path"));
        assert!(!json.contains("spect_path"));
        assert!(!json.contains("annotation"));
    }
}
