//! Speaker tracks from active-speaker detection.

use serde::{Deserialize, Serialize};

/// Axis-aligned face bounding box in source pixel coordinates.
///
/// Serialized as a `[x1, y1, x2, y2]` array, matching the detection tool's
/// on-disk artifact format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct FaceBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl FaceBox {
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Horizontal center of the box.
    pub fn center_x(&self) -> f32 {
        (self.x1 + self.x2) / 2.0
    }
}

impl From<[f32; 4]> for FaceBox {
    fn from(v: [f32; 4]) -> Self {
        Self {
            x1: v[0],
            y1: v[1],
            x2: v[2],
            y2: v[3],
        }
    }
}

impl From<FaceBox> for [f32; 4] {
    fn from(b: FaceBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// One face's trajectory over a clip.
///
/// `frames` and `boxes` are parallel arrays: `boxes[i]` is the face position
/// at frame index `frames[i]` of the clip segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerTrack {
    /// Frame indices this track covers
    pub frames: Vec<u32>,
    /// Bounding box per covered frame
    pub boxes: Vec<FaceBox>,
}

impl SpeakerTrack {
    /// Bounding box at a clip frame index, if the track covers it.
    pub fn box_at(&self, frame: u32) -> Option<FaceBox> {
        let i = self.frames.iter().position(|&f| f == frame)?;
        self.boxes.get(i).copied()
    }
}

/// Per-track, per-frame speaking-confidence scores.
///
/// `scores[t][i]` is the confidence that track `t` is speaking at its `i`-th
/// covered frame (parallel to `SpeakerTrack::frames`).
pub type TrackScores = Vec<Vec<f32>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_face_box_array_form() {
        let b: FaceBox = serde_json::from_str("[10.0, 20.0, 110.0, 140.0]").unwrap();
        assert_eq!(b.width(), 100.0);
        assert_eq!(b.height(), 120.0);
        assert_eq!(b.center_x(), 60.0);

        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "[10.0,20.0,110.0,140.0]");
    }

    #[test]
    fn test_track_artifact_shape() {
        let json = r#"{"frames": [0, 1, 2], "boxes": [[0,0,10,10],[1,0,11,10],[2,0,12,10]]}"#;
        let track: SpeakerTrack = serde_json::from_str(json).unwrap();
        assert_eq!(track.frames.len(), 3);
        assert_eq!(track.box_at(1).unwrap().x1, 1.0);
        assert!(track.box_at(9).is_none());
    }
}
