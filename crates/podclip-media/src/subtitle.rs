//! Caption generation and subtitle burn-in.
//!
//! Captions group the moment's transcript words into short chunks (at most
//! five words, flushed early at sentence-ending punctuation), rendered as an
//! ASS file and burned with FFmpeg's `ass` filter.

use std::fmt::Write as _;
use std::path::Path;

use tracing::info;

use podclip_models::{segments_in_window, TranscriptSegment};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Default words per caption.
pub const MAX_WORDS_PER_CAPTION: usize = 5;

/// ASS header sized for the 1080x1920 vertical render.
const ASS_HEADER: &str = r#"[Script Info]
Title: podclip captions
ScriptType: v4.00+
PlayResX: 1080
PlayResY: 1920
WrapStyle: 0
ScaledBorderAndShadow: yes

[V4+ Styles]
Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding
Style: Default,Anton,96,&H00FFFFFF,&H000000FF,&H00000000,&H80000000,0,0,0,0,100,100,0,0,1,6,0,2,40,40,260,1

[Events]
Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
"#;

/// A caption line in clip-relative time.
#[derive(Debug, Clone, PartialEq)]
pub struct Caption {
    /// Start, seconds from the clip start
    pub start: f64,
    /// End, seconds from the clip start
    pub end: f64,
    /// Caption text
    pub text: String,
}

/// Group the words of `[clip_start, clip_end)` into captions.
///
/// Words are shifted to clip-relative time. A caption closes after
/// `max_words` words or early at sentence-ending punctuation; the last
/// caption's end is clamped to the clip duration.
pub fn build_captions(
    segments: &[TranscriptSegment],
    clip_start: f64,
    clip_end: f64,
    max_words: usize,
) -> Vec<Caption> {
    let duration = clip_end - clip_start;
    let words = segments_in_window(segments, clip_start, clip_end);

    let mut captions = Vec::new();
    let mut chunk: Vec<&TranscriptSegment> = Vec::new();

    for word in &words {
        chunk.push(word);

        let sentence_end = word
            .word
            .trim_end()
            .ends_with(['.', '?', '!']);

        if chunk.len() >= max_words || sentence_end {
            captions.push(close_chunk(&chunk, clip_start, duration));
            chunk.clear();
        }
    }
    if !chunk.is_empty() {
        captions.push(close_chunk(&chunk, clip_start, duration));
    }

    captions
}

fn close_chunk(chunk: &[&TranscriptSegment], clip_start: f64, duration: f64) -> Caption {
    let start = (chunk[0].start - clip_start).max(0.0);
    let end = (chunk[chunk.len() - 1].end - clip_start).clamp(start, duration);
    let text = chunk
        .iter()
        .map(|s| s.word.trim())
        .collect::<Vec<_>>()
        .join(" ");
    Caption { start, end, text }
}

/// Format seconds as an ASS timestamp (`h:mm:ss.cc`).
fn format_ass_time(seconds: f64) -> String {
    let h = (seconds / 3600.0) as u32;
    let m = ((seconds % 3600.0) / 60.0) as u32;
    let s = (seconds % 60.0) as u32;
    let cs = ((seconds % 1.0) * 100.0) as u32;
    format!("{}:{:02}:{:02}.{:02}", h, m, s, cs)
}

/// Render captions as an ASS document.
pub fn render_ass(captions: &[Caption]) -> String {
    let mut doc = ASS_HEADER.to_string();
    for caption in captions {
        // ASS dialogue text is single-line; strip characters that would
        // break the event format.
        let text = caption.text.replace(['\n', '\r'], " ").replace('{', "(").replace('}', ")");
        let _ = writeln!(
            doc,
            "Dialogue: 0,{},{},Default,,0,0,0,,{}",
            format_ass_time(caption.start),
            format_ass_time(caption.end),
            text
        );
    }
    doc
}

/// Burn the moment's captions onto a vertical clip.
///
/// An empty caption window produces a stream copy instead of a filter pass.
pub async fn burn_subtitles(
    video: impl AsRef<Path>,
    output: impl AsRef<Path>,
    segments: &[TranscriptSegment],
    clip_start: f64,
    clip_end: f64,
) -> MediaResult<()> {
    let video = video.as_ref();
    let output = output.as_ref();

    let captions = build_captions(segments, clip_start, clip_end, MAX_WORDS_PER_CAPTION);

    if captions.is_empty() {
        info!(
            "No captions in window; copying {} -> {}",
            video.display(),
            output.display()
        );
        let cmd = FfmpegCommand::new(video, output)
            .video_codec("copy")
            .audio_codec("copy");
        return FfmpegRunner::new().run(&cmd).await;
    }

    info!(
        "Burning {} captions: {} -> {}",
        captions.len(),
        video.display(),
        output.display()
    );

    let temp_dir = tempfile::tempdir()?;
    let ass_path = temp_dir.path().join("captions.ass");
    tokio::fs::write(&ass_path, render_ass(&captions)).await?;

    let filter = format!("ass='{}'", escape_filter_path(&ass_path));
    let cmd = FfmpegCommand::new(video, output)
        .video_filter(filter)
        .video_codec("libx264")
        .preset("veryfast")
        .crf(23)
        .audio_codec("copy");

    FfmpegRunner::new().run(&cmd).await
}

/// Escape a path for use inside an FFmpeg filter argument.
fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").replace(':', "\\:")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(spec: &[(&str, f64, f64)]) -> Vec<TranscriptSegment> {
        spec.iter()
            .map(|(w, s, e)| TranscriptSegment::new(*s, *e, *w))
            .collect()
    }

    #[test]
    fn test_captions_group_five_words() {
        let segments = words(&[
            ("one", 0.0, 0.5),
            ("two", 0.5, 1.0),
            ("three", 1.0, 1.5),
            ("four", 1.5, 2.0),
            ("five", 2.0, 2.5),
            ("six", 2.5, 3.0),
        ]);

        let captions = build_captions(&segments, 0.0, 10.0, 5);
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].text, "one two three four five");
        assert_eq!(captions[1].text, "six");
    }

    #[test]
    fn test_captions_flush_at_sentence_end() {
        let segments = words(&[
            ("Hello", 0.0, 0.5),
            ("there.", 0.5, 1.0),
            ("New", 1.0, 1.5),
            ("sentence", 1.5, 2.0),
        ]);

        let captions = build_captions(&segments, 0.0, 10.0, 5);
        assert_eq!(captions.len(), 2);
        assert_eq!(captions[0].text, "Hello there.");
        assert_eq!(captions[1].text, "New sentence");
    }

    #[test]
    fn test_captions_restricted_to_window_and_shifted() {
        let segments = words(&[
            ("before", 0.0, 1.0),
            ("inside", 10.5, 11.0),
            ("after", 45.0, 46.0),
        ]);

        let captions = build_captions(&segments, 10.0, 40.0, 5);
        assert_eq!(captions.len(), 1);
        assert_eq!(captions[0].text, "inside");
        assert!((captions[0].start - 0.5).abs() < 1e-9);
        assert!((captions[0].end - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_caption_end_clamped_to_clip() {
        // Word overlaps the clip end
        let segments = words(&[("tail", 39.5, 41.0)]);
        let captions = build_captions(&segments, 10.0, 40.0, 5);
        assert_eq!(captions.len(), 1);
        assert!((captions[0].end - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_window_yields_no_captions() {
        let segments = words(&[("early", 0.0, 1.0)]);
        assert!(build_captions(&segments, 100.0, 130.0, 5).is_empty());
    }

    #[test]
    fn test_format_ass_time() {
        assert_eq!(format_ass_time(0.0), "0:00:00.00");
        assert_eq!(format_ass_time(90.5), "0:01:30.50");
        assert_eq!(format_ass_time(3661.25), "1:01:01.25");
    }

    #[test]
    fn test_render_ass_contains_dialogue() {
        let ass = render_ass(&[Caption {
            start: 1.0,
            end: 2.0,
            text: "hello world".to_string(),
        }]);
        assert!(ass.starts_with("[Script Info]"));
        assert!(ass.contains("Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,hello world"));
    }

    #[test]
    fn test_render_ass_sanitizes_braces() {
        let ass = render_ass(&[Caption {
            start: 0.0,
            end: 1.0,
            text: "{\\b1}bold".to_string(),
        }]);
        assert!(!ass.contains("{\\b1}"));
    }
}
