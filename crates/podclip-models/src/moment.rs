//! Clip moments selected from the transcript.

use serde::{Deserialize, Serialize};

/// Maximum number of candidate moments processed per request.
pub const MAX_MOMENTS_PER_REQUEST: usize = 3;

/// A candidate clip window in the source video.
///
/// Intended duration is 30-60 seconds and boundaries should align with
/// sentence boundaries in the transcript; neither is enforced here. A moment
/// is only valid when `end > start`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipMoment {
    /// Window start, seconds
    pub start: f64,
    /// Window end, seconds
    pub end: f64,
}

impl ClipMoment {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Window duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether the window is well-formed (`end > start`).
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }
}

/// Result of processing one moment, reported back to the caller.
///
/// Moments are processed in isolation: a failure is recorded here instead of
/// aborting the remaining moments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentOutcome {
    /// Zero-based clip index
    pub index: usize,
    /// Object-store key of the published clip, when processing succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clip_key: Option<String>,
    /// Error description, when processing failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MomentOutcome {
    /// A moment that was processed and published.
    pub fn published(index: usize, clip_key: impl Into<String>) -> Self {
        Self {
            index,
            clip_key: Some(clip_key.into()),
            error: None,
        }
    }

    /// A moment that failed; siblings keep processing.
    pub fn failed(index: usize, error: impl Into<String>) -> Self {
        Self {
            index,
            clip_key: None,
            error: Some(error.into()),
        }
    }

    pub fn is_published(&self) -> bool {
        self.clip_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moment_validity() {
        assert!(ClipMoment::new(0.0, 2.0).is_valid());
        assert!(!ClipMoment::new(2.0, 2.0).is_valid());
        assert!(!ClipMoment::new(3.0, 2.0).is_valid());
    }

    #[test]
    fn test_moment_duration() {
        assert!((ClipMoment::new(10.0, 40.0).duration() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_moment_deserializes_from_model_output() {
        let moments: Vec<ClipMoment> =
            serde_json::from_str(r#"[{"start": 0, "end": 2}]"#).unwrap();
        assert_eq!(moments, vec![ClipMoment::new(0.0, 2.0)]);
    }

    #[test]
    fn test_outcome_serialization_skips_absent_fields() {
        let ok = serde_json::to_string(&MomentOutcome::published(0, "a/clip_0.mp4")).unwrap();
        assert!(ok.contains("clip_key"));
        assert!(!ok.contains("error"));

        let failed = serde_json::to_string(&MomentOutcome::failed(1, "boom")).unwrap();
        assert!(failed.contains("error"));
        assert!(!failed.contains("clip_key"));
    }
}
