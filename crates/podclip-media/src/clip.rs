//! Clip cutting and audio extraction.

use std::path::Path;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Extract the time range `[start, end)` of a video into a segment file.
///
/// The segment is re-encoded so the cut is frame-accurate; downstream face
/// tracking needs every frame decodable from the segment start.
pub async fn cut_segment(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    start_secs: f64,
    end_secs: f64,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();
    let duration = end_secs - start_secs;

    info!(
        "Cutting segment: {} -> {} (start: {:.2}s, duration: {:.2}s)",
        input.display(),
        output.display(),
        start_secs,
        duration
    );

    let cmd = FfmpegCommand::new(input, output)
        .seek(start_secs)
        .duration(duration)
        .video_codec("libx264")
        .preset("veryfast")
        .crf(23)
        .audio_codec("aac");

    FfmpegRunner::new().run(&cmd).await
}

/// Extract a mono 16 kHz signed-16-bit PCM WAV track from a video.
///
/// This is the input format both the speech recognizer and the
/// speaker-detection tool expect.
pub async fn extract_audio(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    info!(
        "Extracting audio: {} -> {}",
        input.display(),
        output.display()
    );

    let cmd = audio_extract_command(input, output);
    FfmpegRunner::new().run(&cmd).await
}

fn audio_extract_command(input: &Path, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .no_video()
        .output_args(["-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_extraction_is_mono_16k_pcm() {
        let cmd = audio_extract_command(Path::new("in.mp4"), Path::new("out.wav"));
        let args = cmd.build_args();

        assert!(args.contains(&"-vn".to_string()));

        let codec_pos = args.iter().position(|a| a == "-acodec").unwrap();
        assert_eq!(args[codec_pos + 1], "pcm_s16le");

        let rate_pos = args.iter().position(|a| a == "-ar").unwrap();
        assert_eq!(args[rate_pos + 1], "16000");

        let channels_pos = args.iter().position(|a| a == "-ac").unwrap();
        assert_eq!(args[channels_pos + 1], "1");
    }
}
