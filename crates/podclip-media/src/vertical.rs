//! Dominant-speaker vertical composition.
//!
//! Turns a landscape clip segment plus speaker tracks/scores into a
//! 1080x1920 vertical render that keeps the active speaker in frame.
//!
//! Framing policy: per frame, the active face is the track with the highest
//! smoothed speaking score (centered moving average over +/-2 frames);
//! frames with no face fall back to a center crop. Consecutive frames that
//! choose the same track collapse into a crop run, runs shorter than the
//! minimum length merge into their neighbor, and each run is rendered with
//! a fixed crop window before the runs are concatenated.

use std::collections::HashMap;
use std::path::Path;

use tokio::io::AsyncWriteExt;
use tracing::info;

use podclip_models::{SpeakerTrack, TrackScores};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::VideoInfo;

/// Output frame size (9:16 portrait).
pub const OUTPUT_WIDTH: u32 = 1080;
pub const OUTPUT_HEIGHT: u32 = 1920;

/// Moving-average radius for score smoothing, in frames.
const SCORE_SMOOTHING_RADIUS: usize = 2;

/// Runs shorter than this many frames merge into the previous run.
const MIN_RUN_FRAMES: u32 = 13;

/// A contiguous frame range rendered with a single crop window.
#[derive(Debug, Clone, PartialEq)]
pub struct CropRun {
    /// First frame of the run
    pub start_frame: u32,
    /// One past the last frame of the run
    pub end_frame: u32,
    /// Horizontal crop center in source pixels
    pub center_x: f64,
}

impl CropRun {
    pub fn frame_len(&self) -> u32 {
        self.end_frame - self.start_frame
    }
}

/// Smooth a score series with a centered moving average.
fn smooth_scores(scores: &[f32]) -> Vec<f32> {
    let n = scores.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let lo = i.saturating_sub(SCORE_SMOOTHING_RADIUS);
        let hi = (i + SCORE_SMOOTHING_RADIUS + 1).min(n);
        let window = &scores[lo..hi];
        out.push(window.iter().sum::<f32>() / window.len() as f32);
    }
    out
}

/// Per-frame choice of dominant track, or `None` when no track covers the
/// frame.
fn dominant_track_per_frame(
    tracks: &[SpeakerTrack],
    scores: &TrackScores,
    frame_count: u32,
) -> Vec<Option<(usize, f64)>> {
    // Index each track's frames for O(1) lookup, smoothing scores once.
    let indexed: Vec<(HashMap<u32, usize>, Vec<f32>)> = tracks
        .iter()
        .zip(scores.iter())
        .map(|(track, track_scores)| {
            let by_frame = track
                .frames
                .iter()
                .enumerate()
                .map(|(i, &f)| (f, i))
                .collect();
            (by_frame, smooth_scores(track_scores))
        })
        .collect();

    (0..frame_count)
        .map(|frame| {
            let mut best: Option<(usize, f32, f64)> = None;
            for (track_idx, (by_frame, smoothed)) in indexed.iter().enumerate() {
                let Some(&i) = by_frame.get(&frame) else {
                    continue;
                };
                let score = smoothed.get(i).copied().unwrap_or(f32::MIN);
                let center = match tracks[track_idx].boxes.get(i) {
                    Some(b) => b.center_x() as f64,
                    None => continue,
                };
                if best.map_or(true, |(_, s, _)| score > s) {
                    best = Some((track_idx, score, center));
                }
            }
            best.map(|(track_idx, _, center)| (track_idx, center))
        })
        .collect()
}

/// Plan crop runs over a clip from speaker tracks and scores.
///
/// Always returns at least one run for a non-empty clip; with no usable
/// tracks the whole clip becomes a single center-cropped run.
pub fn plan_crop_runs(
    tracks: &[SpeakerTrack],
    scores: &TrackScores,
    frame_count: u32,
    source_width: u32,
) -> Vec<CropRun> {
    if frame_count == 0 {
        return Vec::new();
    }

    let fallback_center = source_width as f64 / 2.0;
    let choices = dominant_track_per_frame(tracks, scores, frame_count);

    // Collapse consecutive same-track frames into runs, averaging centers.
    let mut runs: Vec<(Option<usize>, CropRun)> = Vec::new();
    let mut center_sum = 0.0;
    for (frame, choice) in choices.iter().enumerate() {
        let frame = frame as u32;
        let (track, center) = match choice {
            Some((t, c)) => (Some(*t), *c),
            None => (None, fallback_center),
        };

        match runs.last_mut() {
            Some((last_track, run)) if *last_track == track => {
                center_sum += center;
                run.end_frame = frame + 1;
                run.center_x = center_sum / run.frame_len() as f64;
            }
            _ => {
                center_sum = center;
                runs.push((
                    track,
                    CropRun {
                        start_frame: frame,
                        end_frame: frame + 1,
                        center_x: center,
                    },
                ));
            }
        }
    }

    merge_short_runs(runs.into_iter().map(|(_, r)| r).collect())
}

/// Absorb runs shorter than the minimum into their neighbor so the framing
/// does not jitter on momentary score flips.
fn merge_short_runs(runs: Vec<CropRun>) -> Vec<CropRun> {
    let mut merged: Vec<CropRun> = Vec::with_capacity(runs.len());
    for run in runs {
        let is_short = run.frame_len() < MIN_RUN_FRAMES;
        match merged.last_mut() {
            Some(prev) if is_short => prev.end_frame = run.end_frame,
            _ => merged.push(run),
        }
    }

    // A short leading run can only merge forward.
    while merged.len() > 1 && merged[0].frame_len() < MIN_RUN_FRAMES {
        let first = merged.remove(0);
        merged[0].start_frame = first.start_frame;
    }

    merged
}

/// Crop window x-offset for a run, clamped inside the source frame.
fn crop_x_offset(center_x: f64, source_width: u32, crop_width: u32) -> u32 {
    let max_x = source_width.saturating_sub(crop_width) as f64;
    (center_x - crop_width as f64 / 2.0).clamp(0.0, max_x).round() as u32
}

/// Crop window width for a 9:16 cut of the source height, rounded to even.
fn crop_width_for(source_height: u32) -> u32 {
    let w = source_height * 9 / 16;
    w - (w % 2)
}

/// Render the vertical composition of a clip segment.
///
/// Each crop run is rendered separately, the parts are joined with the
/// concat demuxer, and the clip audio is mapped back in.
pub async fn compose_vertical(
    segment: impl AsRef<Path>,
    audio: impl AsRef<Path>,
    output: impl AsRef<Path>,
    runs: &[CropRun],
    info: &VideoInfo,
) -> MediaResult<()> {
    let segment = segment.as_ref();
    let audio = audio.as_ref();
    let output = output.as_ref();

    if runs.is_empty() {
        return Err(MediaError::InvalidVideo(
            "No crop runs planned for clip".to_string(),
        ));
    }

    info!(
        "Composing vertical video: {} -> {} ({} crop runs)",
        segment.display(),
        output.display(),
        runs.len()
    );

    let crop_w = crop_width_for(info.height);
    let temp_dir = tempfile::tempdir()?;

    // Render each run with its own fixed crop window.
    let mut part_paths = Vec::with_capacity(runs.len());
    for (i, run) in runs.iter().enumerate() {
        let part = temp_dir.path().join(format!("part_{}.mp4", i));
        let x = crop_x_offset(run.center_x, info.width, crop_w);
        let filter = format!(
            "crop={}:ih:{}:0,scale={}:{}",
            crop_w, x, OUTPUT_WIDTH, OUTPUT_HEIGHT
        );

        let cmd = FfmpegCommand::new(segment, &part)
            .seek(run.start_frame as f64 / info.fps)
            .duration(run.frame_len() as f64 / info.fps)
            .video_filter(filter)
            .video_codec("libx264")
            .preset("veryfast")
            .crf(23)
            .no_audio();

        FfmpegRunner::new().run(&cmd).await?;
        part_paths.push(part);
    }

    // Concat demuxer list; parts share identical codec parameters.
    let list_path = temp_dir.path().join("parts.txt");
    let mut list = tokio::fs::File::create(&list_path).await?;
    for part in &part_paths {
        list.write_all(format!("file '{}'\n", part.display()).as_bytes())
            .await?;
    }
    list.flush().await?;

    let cmd = FfmpegCommand::new(&list_path, output)
        .input_arg("-f")
        .input_arg("concat")
        .input_arg("-safe")
        .input_arg("0")
        .extra_input(audio)
        .output_args(["-map", "0:v", "-map", "1:a"])
        .video_codec("copy")
        .audio_codec("aac")
        .output_arg("-shortest");

    FfmpegRunner::new().run(&cmd).await
}
