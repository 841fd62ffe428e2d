//! Per-request clip processing pipeline.
//!
//! Orchestrates one `process_video` request end to end: working-directory
//! lifecycle, source download, transcription, moment selection, and the
//! per-moment cut / speaker-detect / compose / subtitle / publish chain.

pub mod config;
pub mod error;
pub mod moments;
pub mod process;
pub mod run;
pub mod transcribe;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use moments::GeminiClient;
pub use process::{process_request, PipelineContext};
pub use run::WorkingRun;
pub use transcribe::Transcriber;
