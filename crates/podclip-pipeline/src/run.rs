//! Per-request working directory.

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use uuid::Uuid;

/// Ephemeral scratch directory owned by a single request.
///
/// Created at request start under the configured work root, named by a fresh
/// UUID, and removed unconditionally when the request finishes. `cleanup`
/// is the normal removal path; `Drop` is the backstop so the directory
/// cannot outlive its request even on early returns or panics.
#[derive(Debug)]
pub struct WorkingRun {
    id: Uuid,
    dir: PathBuf,
    cleaned: bool,
}

impl WorkingRun {
    /// Allocate a fresh working directory under `work_root`.
    pub async fn create(work_root: impl AsRef<Path>) -> std::io::Result<Self> {
        let id = Uuid::new_v4();
        let dir = work_root.as_ref().join(id.to_string());
        tokio::fs::create_dir_all(&dir).await?;

        info!("Created working directory {}", dir.display());
        Ok(Self {
            id,
            dir,
            cleaned: false,
        })
    }

    /// Run identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The run's directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the downloaded source video.
    pub fn input_path(&self) -> PathBuf {
        self.dir.join("input.mp4")
    }

    /// Path of the full-length extracted audio track.
    pub fn audio_path(&self) -> PathBuf {
        self.dir.join("audio.wav")
    }

    /// Remove the working directory.
    pub async fn cleanup(mut self) {
        self.cleaned = true;
        if let Err(e) = tokio::fs::remove_dir_all(&self.dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove {}: {}", self.dir.display(), e);
            }
        } else {
            info!("Removed working directory {}", self.dir.display());
        }
    }
}

impl Drop for WorkingRun {
    fn drop(&mut self) {
        if !self.cleaned {
            if let Err(e) = std::fs::remove_dir_all(&self.dir) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove {} on drop: {}", self.dir.display(), e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_and_cleanup() {
        let root = TempDir::new().unwrap();
        let run = WorkingRun::create(root.path()).await.unwrap();
        let dir = run.dir().to_path_buf();
        assert!(dir.is_dir());

        run.cleanup().await;
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_drop_removes_directory() {
        let root = TempDir::new().unwrap();
        let dir = {
            let run = WorkingRun::create(root.path()).await.unwrap();
            tokio::fs::write(run.dir().join("input.mp4"), b"x")
                .await
                .unwrap();
            run.dir().to_path_buf()
        };
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_runs_are_distinct() {
        let root = TempDir::new().unwrap();
        let a = WorkingRun::create(root.path()).await.unwrap();
        let b = WorkingRun::create(root.path()).await.unwrap();
        assert_ne!(a.dir(), b.dir());
        a.cleanup().await;
        b.cleanup().await;
    }

    #[tokio::test]
    async fn test_artifact_paths_live_under_run() {
        let root = TempDir::new().unwrap();
        let run = WorkingRun::create(root.path()).await.unwrap();
        assert!(run.input_path().starts_with(run.dir()));
        assert!(run.audio_path().starts_with(run.dir()));
        run.cleanup().await;
    }
}
