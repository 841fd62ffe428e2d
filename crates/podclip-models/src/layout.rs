//! Per-clip working directory layout.

use std::path::{Path, PathBuf};

/// Paths of one clip's artifacts inside a working run.
///
/// The layout is a fixed contract shared with the external active-speaker
/// detection tool, which reads the staged clip from the run root and writes
/// its results under `pywork/`:
///
/// ```text
/// {run}/clip_N.mp4                          staged detector input
/// {run}/clip_N/clip_N_segment.mp4           cut segment
/// {run}/clip_N/pyavi/audio.wav              16 kHz mono audio
/// {run}/clip_N/pyavi/video_out_vertical.mp4
/// {run}/clip_N/pyavi/video_with_subtitles.mp4
/// {run}/clip_N/pywork/tracks.json
/// {run}/clip_N/pywork/scores.json
/// {run}/clip_N/pyframes/
/// ```
#[derive(Debug, Clone)]
pub struct ClipLayout {
    clip_name: String,
    clip_dir: PathBuf,
    staged_input: PathBuf,
}

impl ClipLayout {
    /// Layout for clip `index` under `run_dir`.
    pub fn new(run_dir: impl AsRef<Path>, index: usize) -> Self {
        let run_dir = run_dir.as_ref();
        let clip_name = format!("clip_{}", index);
        Self {
            clip_dir: run_dir.join(&clip_name),
            staged_input: run_dir.join(format!("{}.mp4", clip_name)),
            clip_name,
        }
    }

    /// Clip name (`clip_N`), as passed to the detection tool.
    pub fn clip_name(&self) -> &str {
        &self.clip_name
    }

    /// The clip's own directory.
    pub fn dir(&self) -> &Path {
        &self.clip_dir
    }

    /// Copy of the segment at the run root, where the detector expects it.
    pub fn staged_input(&self) -> &Path {
        &self.staged_input
    }

    pub fn segment_path(&self) -> PathBuf {
        self.clip_dir
            .join(format!("{}_segment.mp4", self.clip_name))
    }

    pub fn audio_path(&self) -> PathBuf {
        self.clip_dir.join("pyavi").join("audio.wav")
    }

    pub fn vertical_path(&self) -> PathBuf {
        self.clip_dir.join("pyavi").join("video_out_vertical.mp4")
    }

    pub fn subtitled_path(&self) -> PathBuf {
        self.clip_dir.join("pyavi").join("video_with_subtitles.mp4")
    }

    pub fn tracks_path(&self) -> PathBuf {
        self.clip_dir.join("pywork").join("tracks.json")
    }

    pub fn scores_path(&self) -> PathBuf {
        self.clip_dir.join("pywork").join("scores.json")
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.clip_dir.join("pyframes")
    }

    /// Directories that must exist before processing the clip.
    pub fn required_dirs(&self) -> Vec<PathBuf> {
        vec![
            self.clip_dir.join("pyavi"),
            self.clip_dir.join("pywork"),
            self.frames_dir(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = ClipLayout::new("/tmp/run", 2);
        assert_eq!(layout.clip_name(), "clip_2");
        assert_eq!(layout.dir(), Path::new("/tmp/run/clip_2"));
        assert_eq!(layout.staged_input(), Path::new("/tmp/run/clip_2.mp4"));
        assert_eq!(
            layout.segment_path(),
            Path::new("/tmp/run/clip_2/clip_2_segment.mp4")
        );
        assert_eq!(
            layout.audio_path(),
            Path::new("/tmp/run/clip_2/pyavi/audio.wav")
        );
        assert_eq!(
            layout.tracks_path(),
            Path::new("/tmp/run/clip_2/pywork/tracks.json")
        );
        assert_eq!(
            layout.scores_path(),
            Path::new("/tmp/run/clip_2/pywork/scores.json")
        );
    }

    #[test]
    fn test_required_dirs_cover_all_artifacts() {
        let layout = ClipLayout::new("/tmp/run", 0);
        let dirs = layout.required_dirs();
        assert!(dirs.contains(&layout.audio_path().parent().unwrap().to_path_buf()));
        assert!(dirs.contains(&layout.tracks_path().parent().unwrap().to_path_buf()));
        assert!(dirs.contains(&layout.frames_dir()));
    }
}
