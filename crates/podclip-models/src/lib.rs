//! Shared data models for the podclip backend.
//!
//! This crate provides Serde-serializable types for:
//! - Word-level transcript segments
//! - Clip moments selected by the language model
//! - Speaker tracks and scores from active-speaker detection
//! - The per-clip working directory layout

pub mod layout;
pub mod moment;
pub mod request;
pub mod speaker;
pub mod transcript;

// Re-export common types
pub use layout::ClipLayout;
pub use moment::{ClipMoment, MomentOutcome, MAX_MOMENTS_PER_REQUEST};
pub use request::{clip_output_key, ClipRequest};
pub use speaker::{FaceBox, SpeakerTrack, TrackScores};
pub use transcript::{segments_in_window, TranscriptSegment};
