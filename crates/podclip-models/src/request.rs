//! Inbound request types.

use serde::{Deserialize, Serialize};

/// Body of `POST /process_video`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipRequest {
    /// Object-store key of the source video
    pub s3_key: String,
}

impl ClipRequest {
    /// Basic validation; the key must be non-empty.
    pub fn validate(&self) -> Result<(), String> {
        if self.s3_key.trim().is_empty() {
            return Err("s3_key must not be empty".to_string());
        }
        Ok(())
    }
}

/// Object-store key for a published clip.
///
/// Clips are stored next to the source video:
/// `dir/source.mp4` -> `dir/clip_{index}.mp4`.
pub fn clip_output_key(source_key: &str, index: usize) -> String {
    match source_key.rsplit_once('/') {
        Some((dir, _)) => format!("{}/clip_{}.mp4", dir, index),
        None => format!("clip_{}.mp4", index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_key_with_directory() {
        assert_eq!(
            clip_output_key("test1/mi65min.mp4", 0),
            "test1/clip_0.mp4"
        );
        assert_eq!(
            clip_output_key("a/b/episode.mp4", 2),
            "a/b/clip_2.mp4"
        );
    }

    #[test]
    fn test_output_key_without_directory() {
        assert_eq!(clip_output_key("episode.mp4", 1), "clip_1.mp4");
    }

    #[test]
    fn test_request_validation() {
        assert!(ClipRequest { s3_key: "a/b.mp4".into() }.validate().is_ok());
        assert!(ClipRequest { s3_key: "  ".into() }.validate().is_err());
    }
}
