//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Language model request failed: {0}")]
    ModelRequest(String),

    #[error("Storage error: {0}")]
    Storage(#[from] podclip_storage::StorageError),

    #[error("Media error: {0}")]
    Media(#[from] podclip_media::MediaError),

    #[error("Speaker detection error: {0}")]
    SpeakerDetection(#[from] podclip_asd::AsdError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn transcription(msg: impl Into<String>) -> Self {
        Self::Transcription(msg.into())
    }

    pub fn model_request(msg: impl Into<String>) -> Self {
        Self::ModelRequest(msg.into())
    }
}
