// Audio processing module
// Handles WAV file ingestion and spectrogram computation

pub mod ingest;
pub mod spectrogram;

pub use ingest::{load_wav, AudioData, AudioError};
pub use spectrogram::{
    read_spect_file, write_spect_file, SpectParams, Spectrogram, SpectrogramError,
    SpectrogramGenerator, StftGenerator, TransformType,
};
