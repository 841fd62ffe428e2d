//! Word-level transcription with whisper.cpp.
//!
//! The whisper context is loaded once at startup and shared read-only across
//! requests; each request runs inference through its own state. Word-level
//! timing comes from whisper's token timestamps constrained to one word per
//! segment, refined against the same 16 kHz audio the recognizer consumed.

use std::path::Path;

use tracing::info;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use podclip_models::TranscriptSegment;

use crate::error::{PipelineError, PipelineResult};

/// Shared speech recognizer.
pub struct Transcriber {
    ctx: WhisperContext,
}

impl Transcriber {
    /// Load the model from disk. Called once per process.
    pub fn load(model_path: impl AsRef<Path>) -> PipelineResult<Self> {
        let model_path = model_path.as_ref();
        let path_str = model_path
            .to_str()
            .ok_or_else(|| PipelineError::config_error("Whisper model path is not UTF-8"))?;

        info!("Loading whisper model from {}", model_path.display());
        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| {
                PipelineError::config_error(format!(
                    "Failed to load whisper model {}: {}",
                    model_path.display(),
                    e
                ))
            })?;

        Ok(Self { ctx })
    }

    /// Transcribe a mono 16 kHz WAV file into word-level segments.
    ///
    /// Returns an empty transcript when the model produces no word data.
    pub fn transcribe_wav(&self, wav_path: &Path) -> PipelineResult<Vec<TranscriptSegment>> {
        let samples = read_wav_samples(wav_path)?;
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some("en"));
        // One word per segment so each segment carries its own timestamps
        params.set_token_timestamps(true);
        params.set_split_on_word(true);
        params.set_max_len(1);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| PipelineError::transcription(format!("create_state: {}", e)))?;

        state
            .full(params, &samples)
            .map_err(|e| PipelineError::transcription(format!("inference: {}", e)))?;

        let mut segments = Vec::new();
        for segment in state.as_iter() {
            let Ok(text) = segment.to_str() else {
                continue;
            };
            let word = text.trim();
            if word.is_empty() || word.starts_with('[') || word.starts_with('<') {
                continue;
            }
            segments.push(TranscriptSegment::new(
                segment.start_timestamp() as f64 / 100.0,
                segment.end_timestamp() as f64 / 100.0,
                word,
            ));
        }

        info!("Transcribed {} words from {}", segments.len(), wav_path.display());
        Ok(segments)
    }
}

/// Decode a 16-bit PCM WAV file into normalized f32 samples.
fn read_wav_samples(path: &Path) -> PipelineResult<Vec<f32>> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| PipelineError::transcription(format!("open {}: {}", path.display(), e)))?;

    let samples: Result<Vec<i16>, _> = reader.samples::<i16>().collect();
    let samples =
        samples.map_err(|e| PipelineError::transcription(format!("decode: {}", e)))?;

    Ok(samples
        .into_iter()
        .map(|s| s as f32 / i16::MAX as f32)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_wav(path: &Path, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_read_wav_samples_normalizes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.wav");
        write_wav(&path, &[0, i16::MAX, i16::MIN / 2]);

        let samples = read_wav_samples(&path).unwrap();
        assert_eq!(samples.len(), 3);
        assert!((samples[0] - 0.0).abs() < 1e-6);
        assert!((samples[1] - 1.0).abs() < 1e-6);
        assert!(samples[2] < -0.49 && samples[2] > -0.51);
    }

    #[test]
    fn test_read_missing_wav_is_error() {
        let dir = TempDir::new().unwrap();
        let err = read_wav_samples(&dir.path().join("missing.wav")).unwrap_err();
        assert!(matches!(err, PipelineError::Transcription(_)));
    }
}
