//! Speaker-detection error types.

use std::path::PathBuf;
use thiserror::Error;

pub type AsdResult<T> = Result<T, AsdError>;

#[derive(Debug, Error)]
pub enum AsdError {
    #[error("Speaker detection tool failed (exit code {exit_code:?}): {stderr}")]
    ToolFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Speaker detection artifact missing: {0}")]
    ArtifactMissing(PathBuf),

    #[error("Malformed speaker detection artifact {path}: {message}")]
    MalformedArtifact { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AsdError {
    pub fn tool_failed(exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::ToolFailed {
            exit_code,
            stderr: stderr.into(),
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MalformedArtifact {
            path: path.into(),
            message: message.into(),
        }
    }
}
