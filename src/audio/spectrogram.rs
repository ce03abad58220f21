// Spectrogram computation
// Hann-windowed STFT magnitude spectrograms, parameterized by SpectParams

use realfft::RealFftPlanner;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;

use crate::audio::AudioData;

#[derive(Debug, Error)]
pub enum SpectrogramError {
    #[error("Invalid spectrogram parameters: {0}")]
    BadParams(String),

    #[error("Audio too short for one frame: {samples} samples, fft_size {fft_size}")]
    AudioTooShort { samples: usize, fft_size: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Amplitude scaling applied to the magnitude spectrogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformType {
    Linear,
    LogSpect,
}

/// Parameters for the spectrogram transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectParams {
    /// FFT window size in samples
    pub fft_size: usize,

    /// Hop size in samples (advance between frames)
    pub step_size: usize,

    /// Keep only bins within (low_hz, high_hz); None keeps the full band
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freq_cutoffs: Option<(f64, f64)>,

    /// Floor applied after the transform; values below are clamped to it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresh: Option<f64>,

    pub transform_type: TransformType,
}

impl Default for SpectParams {
    fn default() -> Self {
        SpectParams {
            fft_size: 512,
            step_size: 64,
            freq_cutoffs: None,
            thresh: None,
            transform_type: TransformType::LogSpect,
        }
    }
}

/// Time-frequency matrix derived from one recording
///
/// `matrix` holds one row per frequency bin and one column per frame,
/// so `matrix[i][j]` is the magnitude at `freqs[i]`, `times[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrogram {
    pub freqs: Vec<f64>,
    pub times: Vec<f64>,
    pub matrix: Vec<Vec<f64>>,
}

/// Pluggable spectrogram computation
///
/// The dataset pipeline only depends on this trait; tests inject fakes.
pub trait SpectrogramGenerator {
    fn generate(
        &self,
        audio: &AudioData,
        params: &SpectParams,
    ) -> Result<Spectrogram, SpectrogramError>;
}

/// Default generator: Hann-windowed STFT via realfft
#[derive(Debug, Default)]
pub struct StftGenerator;

impl SpectrogramGenerator for StftGenerator {
    fn generate(
        &self,
        audio: &AudioData,
        params: &SpectParams,
    ) -> Result<Spectrogram, SpectrogramError> {
        if params.fft_size == 0 || params.step_size == 0 {
            return Err(SpectrogramError::BadParams(
                "fft_size and step_size must be nonzero".to_string(),
            ));
        }

        let samples = &audio.samples;
        if samples.len() < params.fft_size {
            return Err(SpectrogramError::AudioTooShort {
                samples: samples.len(),
                fft_size: params.fft_size,
            });
        }

        let num_frames = (samples.len() - params.fft_size) / params.step_size + 1;
        let num_bins = params.fft_size / 2 + 1;
        let bin_width = audio.sample_rate as f64 / params.fft_size as f64;

        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(params.fft_size);

        // One magnitude spectrum per frame, frames-major for now
        let mut frames = Vec::with_capacity(num_frames);
        for frame_idx in 0..num_frames {
            let start = frame_idx * params.step_size;
            let mut windowed = samples[start..start + params.fft_size].to_vec();
            apply_hann_window(&mut windowed);

            let mut spectrum = fft.make_output_vec();
            fft.process(&mut windowed, &mut spectrum).unwrap();

            let magnitudes: Vec<f64> = spectrum.iter().map(|c| c.norm() as f64).collect();
            frames.push(magnitudes);
        }

        // Select the bins within the requested band
        let (low_bin, high_bin) = match params.freq_cutoffs {
            Some((low_hz, high_hz)) => {
                if low_hz >= high_hz {
                    return Err(SpectrogramError::BadParams(format!(
                        "freq_cutoffs low {} >= high {}",
                        low_hz, high_hz
                    )));
                }
                let low = (low_hz / bin_width).ceil() as usize;
                let high = ((high_hz / bin_width).floor() as usize).min(num_bins - 1);
                (low.min(high), high)
            }
            None => (0, num_bins - 1),
        };

        let freqs: Vec<f64> = (low_bin..=high_bin).map(|b| b as f64 * bin_width).collect();
        let times: Vec<f64> = (0..num_frames)
            .map(|f| (f * params.step_size) as f64 / audio.sample_rate as f64)
            .collect();

        // Transpose to bins-major and apply transform + floor
        let mut matrix = Vec::with_capacity(freqs.len());
        for bin in low_bin..=high_bin {
            let mut row = Vec::with_capacity(num_frames);
            for frame in &frames {
                let mut value = frame[bin];
                if params.transform_type == TransformType::LogSpect {
                    value = 20.0 * (value + 1e-10).log10();
                }
                if let Some(thresh) = params.thresh {
                    value = value.max(thresh);
                }
                row.push(value);
            }
            matrix.push(row);
        }

        Ok(Spectrogram {
            freqs,
            times,
            matrix,
        })
    }
}

/// Apply Hann window function to reduce spectral leakage
fn apply_hann_window(samples: &mut [f32]) {
    let n = samples.len();
    if n == 0 {
        return;
    }

    for (i, sample) in samples.iter_mut().enumerate() {
        let window_val = 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n as f32).cos());
        *sample *= window_val;
    }
}

/// Write a spectrogram to a JSON file
pub fn write_spect_file(spect: &Spectrogram, path: &Path) -> Result<(), SpectrogramError> {
    let file = File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), spect)?;
    Ok(())
}

/// Read a spectrogram back from a JSON file
pub fn read_spect_file(path: &Path) -> Result<Spectrogram, SpectrogramError> {
    let file = File::open(path)?;
    let spect = serde_json::from_reader(BufReader::new(file))?;
    Ok(spect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sine_audio(freq_hz: f32, sample_rate: u32, len: usize) -> AudioData {
        let samples = (0..len)
            .map(|i| {
                (2.0 * std::f32::consts::PI * freq_hz * i as f32 / sample_rate as f32).sin()
            })
            .collect();
        AudioData {
            samples,
            sample_rate,
        }
    }

    #[test]
    fn test_hann_window_tapers_edges() {
        let mut samples = vec![1.0; 100];
        apply_hann_window(&mut samples);

        assert!(samples[0] < 0.1);
        assert!(samples[99] < 0.1);
        assert!(samples[50] > 0.9);
    }

    #[test]
    fn test_stft_shape() {
        let audio = sine_audio(1000.0, 32000, 4096);
        let params = SpectParams {
            fft_size: 512,
            step_size: 64,
            freq_cutoffs: None,
            thresh: None,
            transform_type: TransformType::Linear,
        };

        let spect = StftGenerator.generate(&audio, &params).unwrap();

        let expected_frames = (4096 - 512) / 64 + 1;
        assert_eq!(spect.freqs.len(), 257);
        assert_eq!(spect.times.len(), expected_frames);
        assert_eq!(spect.matrix.len(), 257);
        assert_eq!(spect.matrix[0].len(), expected_frames);
        assert_eq!(spect.times[0], 0.0);
    }

    #[test]
    fn test_sine_peak_lands_in_right_bin() {
        let audio = sine_audio(1000.0, 32000, 4096);
        let params = SpectParams {
            fft_size: 512,
            step_size: 64,
            freq_cutoffs: None,
            thresh: None,
            transform_type: TransformType::Linear,
        };

        let spect = StftGenerator.generate(&audio, &params).unwrap();

        // Sum energy per bin across frames; peak should sit near 1000 Hz
        let energies: Vec<f64> = spect.matrix.iter().map(|row| row.iter().sum()).collect();
        let peak_bin = energies
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        let peak_freq = spect.freqs[peak_bin];

        let bin_width = 32000.0 / 512.0;
        assert!((peak_freq - 1000.0).abs() <= bin_width);
    }

    #[test]
    fn test_freq_cutoffs_limit_band() {
        let audio = sine_audio(1000.0, 32000, 2048);
        let params = SpectParams {
            fft_size: 512,
            step_size: 64,
            freq_cutoffs: Some((500.0, 10000.0)),
            thresh: None,
            transform_type: TransformType::Linear,
        };

        let spect = StftGenerator.generate(&audio, &params).unwrap();

        assert!(spect.freqs.first().copied().unwrap() >= 500.0);
        assert!(spect.freqs.last().copied().unwrap() <= 10000.0);
    }

    #[test]
    fn test_thresh_floors_log_spect() {
        let audio = sine_audio(1000.0, 32000, 2048);
        let params = SpectParams {
            fft_size: 512,
            step_size: 64,
            freq_cutoffs: None,
            thresh: Some(6.25),
            transform_type: TransformType::LogSpect,
        };

        let spect = StftGenerator.generate(&audio, &params).unwrap();

        for row in &spect.matrix {
            for &value in row {
                assert!(value >= 6.25);
            }
        }
    }

    #[test]
    fn test_audio_too_short() {
        let audio = sine_audio(1000.0, 32000, 100);
        let params = SpectParams::default();

        let result = StftGenerator.generate(&audio, &params);
        assert!(matches!(
            result,
            Err(SpectrogramError::AudioTooShort { .. })
        ));
    }

    #[test]
    fn test_zero_step_size_rejected() {
        let audio = sine_audio(1000.0, 32000, 1024);
        let params = SpectParams {
            step_size: 0,
            ..SpectParams::default()
        };

        let result = StftGenerator.generate(&audio, &params);
        assert!(matches!(result, Err(SpectrogramError::BadParams(_))));
    }

    #[test]
    fn test_spect_file_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let spect_path = temp_dir.path().join("test.spect.json");

        let audio = sine_audio(2000.0, 32000, 2048);
        let spect = StftGenerator
            .generate(&audio, &SpectParams::default())
            .unwrap();

        write_spect_file(&spect, &spect_path).unwrap();
        let loaded = read_spect_file(&spect_path).unwrap();

        assert_eq!(spect, loaded);
    }
}
