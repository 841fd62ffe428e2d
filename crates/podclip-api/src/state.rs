//! Application state.

use std::sync::Arc;

use podclip_pipeline::PipelineContext;

use crate::config::ApiConfig;

/// Shared application state.
///
/// The pipeline context holds the expensive pieces (whisper model, storage
/// and model clients) loaded once at startup and reused across requests.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<PipelineContext>,
}

impl AppState {
    /// Create new application state.
    pub async fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let pipeline = PipelineContext::from_env().await?;

        Ok(Self {
            config,
            pipeline: Arc::new(pipeline),
        })
    }
}
