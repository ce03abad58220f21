// Vocalization builder
// Turns one filtered candidate into one dataset record

use std::path::{Path, PathBuf};

use crate::audio::{self, SpectParams, SpectrogramGenerator};
use crate::dataset::assemble::DatasetError;
use crate::dataset::filter::Candidate;
use crate::dataset::model::{DatasetMode, Vocalization};

/// Build one `Vocalization` from a candidate.
///
/// In audio mode the candidate path becomes `audio_path`; when `compute` is
/// set the recording is decoded, the spectrogram generated and written under
/// `output_dir`, and the derived file recorded as `spect_path`. When unset,
/// `spect_path` stays absent and computation is deferred to a later stage.
///
/// In spectrogram mode the candidate path becomes `spect_path` directly.
pub fn build(
    candidate: Candidate,
    mode: DatasetMode,
    spect_params: Option<&SpectParams>,
    compute: bool,
    output_dir: &Path,
    generator: &dyn SpectrogramGenerator,
) -> Result<Vocalization, DatasetError> {
    match mode {
        DatasetMode::Audio(_) => {
            let spect_path = if compute {
                // Preconditions in the assembler guarantee params here
                let params = spect_params.ok_or_else(|| {
                    DatasetError::Configuration(
                        "spectrogram computation requires spect_params".to_string(),
                    )
                })?;
                Some(derive_spectrogram(
                    &candidate.path,
                    params,
                    output_dir,
                    generator,
                )?)
            } else {
                None
            };

            Ok(Vocalization {
                audio_path: Some(candidate.path),
                spect_path,
                annotation: candidate.annotation,
                spect_params: spect_params.cloned(),
            })
        }
        DatasetMode::Spectrogram(_) => Ok(Vocalization {
            audio_path: None,
            spect_path: Some(candidate.path),
            annotation: candidate.annotation,
            spect_params: None,
        }),
    }
}

/// Decode the recording, run the generator, and write the derived
/// spectrogram next to the other pipeline outputs.
fn derive_spectrogram(
    audio_path: &Path,
    params: &SpectParams,
    output_dir: &Path,
    generator: &dyn SpectrogramGenerator,
) -> Result<PathBuf, DatasetError> {
    let audio = audio::load_wav(audio_path)?;
    let spect = generator.generate(&audio, params)?;

    let stem = audio_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "spect".to_string());
    let spect_path = output_dir.join(format!("{stem}.spect.json"));
    audio::write_spect_file(&spect, &spect_path)?;

    Ok(spect_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioData, Spectrogram, SpectrogramError, StftGenerator};
    use crate::dataset::model::{AudioFormat, SpectFormat};
    use tempfile::TempDir;

    /// Generator that returns a canned spectrogram without touching realfft
    struct FakeGenerator;

    impl SpectrogramGenerator for FakeGenerator {
        fn generate(
            &self,
            _audio: &AudioData,
            _params: &SpectParams,
        ) -> Result<Spectrogram, SpectrogramError> {
            Ok(Spectrogram {
                freqs: vec![0.0, 62.5],
                times: vec![0.0],
                matrix: vec![vec![1.0], vec![2.0]],
            })
        }
    }

    fn write_wav(path: &Path) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 32000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..2048i32 {
            writer.write_sample(((i % 64) * 256) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_build_audio_mode_lazy() {
        let temp_dir = TempDir::new().unwrap();
        let candidate = Candidate {
            path: temp_dir.path().join("a.wav"),
            annotation: None,
        };
        let params = SpectParams::default();

        let voc = build(
            candidate,
            DatasetMode::Audio(AudioFormat::Wav),
            Some(&params),
            false,
            temp_dir.path(),
            &StftGenerator,
        )
        .unwrap();

        assert!(voc.audio_path.is_some());
        assert!(voc.spect_path.is_none());
        assert_eq!(voc.spect_params, Some(params));
    }

    #[test]
    fn test_build_audio_mode_eager_writes_spect_file() {
        let temp_dir = TempDir::new().unwrap();
        let wav_path = temp_dir.path().join("a.wav");
        write_wav(&wav_path);
        let candidate = Candidate {
            path: wav_path.clone(),
            annotation: None,
        };
        let params = SpectParams::default();

        let voc = build(
            candidate,
            DatasetMode::Audio(AudioFormat::Wav),
            Some(&params),
            true,
            temp_dir.path(),
            &FakeGenerator,
        )
        .unwrap();

        assert_eq!(voc.audio_path, Some(wav_path));
        let spect_path = voc.spect_path.unwrap();
        assert!(spect_path.is_file());
        assert!(spect_path.ends_with("a.spect.json"));

        let spect = crate::audio::read_spect_file(&spect_path).unwrap();
        assert_eq!(spect.matrix.len(), 2);
    }

    #[test]
    fn test_build_spect_mode() {
        let temp_dir = TempDir::new().unwrap();
        let spect_file = temp_dir.path().join("a.json");
        let candidate = Candidate {
            path: spect_file.clone(),
            annotation: None,
        };

        let voc = build(
            candidate,
            DatasetMode::Spectrogram(SpectFormat::Json),
            None,
            false,
            temp_dir.path(),
            &StftGenerator,
        )
        .unwrap();

        assert!(voc.audio_path.is_none());
        assert_eq!(voc.spect_path, Some(spect_file));
        assert!(voc.spect_params.is_none());
    }
}
