//! Word-level transcript segments.

use serde::{Deserialize, Serialize};

/// A single recognized word with its aligned time span.
///
/// Timestamps are floating-point seconds as returned by the aligner and are
/// assumed (not enforced) to be non-overlapping and ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start of the word, seconds from the beginning of the source video
    pub start: f64,
    /// End of the word, seconds
    pub end: f64,
    /// The recognized word
    pub word: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, word: impl Into<String>) -> Self {
        Self {
            start,
            end,
            word: word.into(),
        }
    }
}

/// Restrict a transcript to the words overlapping `[start, end)`.
///
/// A word is included when any part of it falls inside the window. Order is
/// preserved.
pub fn segments_in_window(
    segments: &[TranscriptSegment],
    start: f64,
    end: f64,
) -> Vec<TranscriptSegment> {
    segments
        .iter()
        .filter(|s| s.end > start && s.start < end)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript() -> Vec<TranscriptSegment> {
        vec![
            TranscriptSegment::new(0.0, 1.0, "Hi"),
            TranscriptSegment::new(1.0, 2.0, "there"),
            TranscriptSegment::new(2.5, 3.0, "friend"),
        ]
    }

    #[test]
    fn test_window_restriction() {
        let words = segments_in_window(&transcript(), 0.0, 2.0);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].word, "Hi");
        assert_eq!(words[1].word, "there");
    }

    #[test]
    fn test_window_includes_partial_overlap() {
        let words = segments_in_window(&transcript(), 0.5, 2.7);
        assert_eq!(words.len(), 3);
    }

    #[test]
    fn test_empty_window() {
        let words = segments_in_window(&transcript(), 10.0, 20.0);
        assert!(words.is_empty());
    }

    #[test]
    fn test_serde_roundtrip_shape() {
        let json = r#"{"start":0.0,"end":1.0,"word":"Hi"}"#;
        let seg: TranscriptSegment = serde_json::from_str(json).unwrap();
        assert_eq!(seg, TranscriptSegment::new(0.0, 1.0, "Hi"));
    }
}
