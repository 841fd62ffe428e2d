//! Pipeline configuration.

use std::path::PathBuf;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root directory for per-request working directories
    pub work_dir: PathBuf,
    /// Path to the whisper.cpp model file
    pub whisper_model_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("/tmp/podclip"),
            whisper_model_path: PathBuf::from("models/ggml-base.en.bin"),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            work_dir: std::env::var("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.work_dir),
            whisper_model_path: std::env::var("WHISPER_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(default.whisper_model_path),
        }
    }
}
