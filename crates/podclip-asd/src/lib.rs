//! Boundary to the external active-speaker-detection tool.
//!
//! The tool is invoked as a subprocess over a staged clip and leaves two
//! JSON artifacts (face tracks and per-frame speaking scores) on disk. Both
//! the exit status and the presence of the artifacts are checked before the
//! results are deserialized.

pub mod detector;
pub mod error;

pub use detector::{AsdConfig, SpeakerDetection, SpeakerDetector};
pub use error::{AsdError, AsdResult};
