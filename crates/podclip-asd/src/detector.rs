//! Active-speaker-detection tool invocation.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use serde::de::DeserializeOwned;
use tokio::process::Command;
use tracing::{debug, info, warn};

use podclip_models::{ClipLayout, SpeakerTrack, TrackScores};

use crate::error::{AsdError, AsdResult};

/// Configuration for the detection tool.
#[derive(Debug, Clone)]
pub struct AsdConfig {
    /// Directory containing the tool and its model weights
    pub home: PathBuf,
    /// Python interpreter used to run the tool
    pub python: String,
    /// Tool entry script, relative to `home`
    pub script: String,
    /// Pretrained model path, relative to `home`
    pub model: String,
}

impl Default for AsdConfig {
    fn default() -> Self {
        Self {
            home: PathBuf::from("/asd"),
            python: "python3".to_string(),
            script: "Columbia_test.py".to_string(),
            model: "weight/finetuning_TalkSet.model".to_string(),
        }
    }
}

impl AsdConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            home: std::env::var("ASD_HOME")
                .map(PathBuf::from)
                .unwrap_or(default.home),
            python: std::env::var("ASD_PYTHON").unwrap_or(default.python),
            script: std::env::var("ASD_SCRIPT").unwrap_or(default.script),
            model: std::env::var("ASD_MODEL").unwrap_or(default.model),
        }
    }
}

/// Deserialized detection results for one clip.
#[derive(Debug, Clone)]
pub struct SpeakerDetection {
    pub tracks: Vec<SpeakerTrack>,
    pub scores: TrackScores,
}

/// Runner for the external detection tool.
#[derive(Debug, Clone)]
pub struct SpeakerDetector {
    config: AsdConfig,
}

impl SpeakerDetector {
    pub fn new(config: AsdConfig) -> Self {
        Self { config }
    }

    /// Create from environment variables.
    pub fn from_env() -> Self {
        Self::new(AsdConfig::from_env())
    }

    /// Run detection over a cut clip and recover its artifacts.
    ///
    /// Stages the segment at the run root under the clip's name, invokes the
    /// tool synchronously, then requires a zero exit status and both
    /// artifacts before deserializing them.
    pub async fn detect(
        &self,
        run_dir: &Path,
        layout: &ClipLayout,
    ) -> AsdResult<SpeakerDetection> {
        tokio::fs::copy(layout.segment_path(), layout.staged_input()).await?;

        let started = Instant::now();
        let output = Command::new(&self.config.python)
            .arg(&self.config.script)
            .arg("--videoName")
            .arg(layout.clip_name())
            .arg("--videoFolder")
            .arg(run_dir)
            .arg("--pretrainModel")
            .arg(&self.config.model)
            .current_dir(&self.config.home)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        info!(
            "Speaker detection for {} completed in {:.2}s",
            layout.clip_name(),
            started.elapsed().as_secs_f64()
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            warn!(
                "Speaker detection tool exited with {:?}: {}",
                output.status.code(),
                stderr
            );
            return Err(AsdError::tool_failed(output.status.code(), stderr));
        }

        load_artifacts(layout).await
    }
}

/// Load and deserialize the tool's artifacts for a clip.
///
/// Both files must exist regardless of how the tool exited.
pub async fn load_artifacts(layout: &ClipLayout) -> AsdResult<SpeakerDetection> {
    let tracks: Vec<SpeakerTrack> = read_artifact(&layout.tracks_path()).await?;
    let scores: TrackScores = read_artifact(&layout.scores_path()).await?;

    if tracks.len() != scores.len() {
        return Err(AsdError::malformed(
            layout.scores_path(),
            format!(
                "{} score series for {} tracks",
                scores.len(),
                tracks.len()
            ),
        ));
    }

    debug!(
        "Loaded {} speaker tracks for {}",
        tracks.len(),
        layout.clip_name()
    );

    Ok(SpeakerDetection { tracks, scores })
}

async fn read_artifact<T: DeserializeOwned>(path: &Path) -> AsdResult<T> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AsdError::ArtifactMissing(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    serde_json::from_slice(&bytes).map_err(|e| AsdError::malformed(path, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn layout_with(tracks: Option<&str>, scores: Option<&str>) -> (TempDir, ClipLayout) {
        let dir = TempDir::new().unwrap();
        let layout = ClipLayout::new(dir.path(), 0);
        for d in layout.required_dirs() {
            tokio::fs::create_dir_all(d).await.unwrap();
        }
        if let Some(t) = tracks {
            tokio::fs::write(layout.tracks_path(), t).await.unwrap();
        }
        if let Some(s) = scores {
            tokio::fs::write(layout.scores_path(), s).await.unwrap();
        }
        (dir, layout)
    }

    const TRACKS_JSON: &str = r#"[{"frames": [0, 1], "boxes": [[0,0,10,10],[1,0,11,10]]}]"#;

    #[tokio::test]
    async fn test_load_artifacts() {
        let (_dir, layout) = layout_with(Some(TRACKS_JSON), Some("[[0.5, 0.8]]")).await;

        let detection = load_artifacts(&layout).await.unwrap();
        assert_eq!(detection.tracks.len(), 1);
        assert_eq!(detection.scores[0], vec![0.5, 0.8]);
    }

    #[tokio::test]
    async fn test_missing_scores_is_artifact_missing() {
        let (_dir, layout) = layout_with(Some(TRACKS_JSON), None).await;

        let err = load_artifacts(&layout).await.unwrap_err();
        match err {
            AsdError::ArtifactMissing(path) => assert_eq!(path, layout.scores_path()),
            other => panic!("expected ArtifactMissing, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_tracks_is_artifact_missing() {
        let (_dir, layout) = layout_with(None, Some("[]")).await;

        assert!(matches!(
            load_artifacts(&layout).await.unwrap_err(),
            AsdError::ArtifactMissing(_)
        ));
    }

    #[tokio::test]
    async fn test_track_score_count_mismatch_is_malformed() {
        let (_dir, layout) = layout_with(Some(TRACKS_JSON), Some("[[0.5], [0.1]]")).await;

        assert!(matches!(
            load_artifacts(&layout).await.unwrap_err(),
            AsdError::MalformedArtifact { .. }
        ));
    }

    #[tokio::test]
    async fn test_unparseable_artifact_is_malformed() {
        let (_dir, layout) = layout_with(Some("not json"), Some("[]")).await;

        assert!(matches!(
            load_artifacts(&layout).await.unwrap_err(),
            AsdError::MalformedArtifact { .. }
        ));
    }

    #[test]
    fn test_config_defaults() {
        let config = AsdConfig::default();
        assert_eq!(config.home, PathBuf::from("/asd"));
        assert_eq!(config.script, "Columbia_test.py");
    }
}
