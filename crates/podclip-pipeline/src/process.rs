//! Request processing orchestration.
//!
//! Coordinates the full pipeline for one request: download, transcribe,
//! select moments, then the per-moment cut / detect / compose / subtitle /
//! publish chain. Moments are processed sequentially but in isolation: one
//! moment's failure is recorded in its outcome and does not abort siblings.

use std::sync::Arc;

use tracing::{error, info};

use podclip_asd::SpeakerDetector;
use podclip_media as media;
use podclip_models::{clip_output_key, ClipLayout, ClipMoment, MomentOutcome, TranscriptSegment};
use podclip_storage::S3Client;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::moments::GeminiClient;
use crate::run::WorkingRun;
use crate::transcribe::Transcriber;

/// Shared, read-only pipeline dependencies.
///
/// Built once at worker startup; every request borrows the same model
/// handles and clients.
pub struct PipelineContext {
    pub config: PipelineConfig,
    pub storage: S3Client,
    pub transcriber: Arc<Transcriber>,
    pub gemini: GeminiClient,
    pub detector: SpeakerDetector,
}

impl PipelineContext {
    /// Create the context from the environment, loading the whisper model.
    pub async fn from_env() -> PipelineResult<Self> {
        let config = PipelineConfig::from_env();
        let storage = S3Client::from_env().await?;
        let transcriber = Arc::new(Transcriber::load(&config.whisper_model_path)?);
        let gemini = GeminiClient::from_env()?;
        let detector = SpeakerDetector::from_env();

        Ok(Self {
            config,
            storage,
            transcriber,
            gemini,
            detector,
        })
    }
}

/// Process one clip request end to end.
///
/// The working directory is removed on every exit path before the result is
/// returned.
pub async fn process_request(
    ctx: &PipelineContext,
    s3_key: &str,
) -> PipelineResult<Vec<MomentOutcome>> {
    let run = WorkingRun::create(&ctx.config.work_dir).await?;
    info!(run_id = %run.id(), s3_key, "Processing video");

    let result = run_pipeline(ctx, &run, s3_key).await;
    run.cleanup().await;

    result
}

async fn run_pipeline(
    ctx: &PipelineContext,
    run: &WorkingRun,
    s3_key: &str,
) -> PipelineResult<Vec<MomentOutcome>> {
    // Fetch the source video
    let input = run.input_path();
    ctx.storage.download_file(s3_key, &input).await?;

    // Transcribe
    media::extract_audio(&input, &run.audio_path()).await?;
    let transcript = {
        let transcriber = Arc::clone(&ctx.transcriber);
        let wav = run.audio_path();
        tokio::task::spawn_blocking(move || transcriber.transcribe_wav(&wav))
            .await
            .map_err(|e| {
                PipelineError::transcription(format!("transcription task failed: {}", e))
            })??
    };

    // Select moments
    let moments = ctx.gemini.select_moments(&transcript).await?;
    if moments.is_empty() {
        info!(run_id = %run.id(), "No clip moments found");
        return Ok(Vec::new());
    }

    // Process each moment in isolation
    let mut outcomes = Vec::with_capacity(moments.len());
    for (index, moment) in moments.iter().enumerate() {
        info!(
            run_id = %run.id(),
            index,
            "Processing clip from {:.2}s to {:.2}s",
            moment.start,
            moment.end
        );

        match process_moment(ctx, run, s3_key, index, moment, &transcript).await {
            Ok(clip_key) => outcomes.push(MomentOutcome::published(index, clip_key)),
            Err(e) => {
                error!(run_id = %run.id(), index, "Clip failed: {}", e);
                outcomes.push(MomentOutcome::failed(index, e.to_string()));
            }
        }
    }

    Ok(outcomes)
}

/// Cut, analyze, compose, subtitle and publish a single moment.
async fn process_moment(
    ctx: &PipelineContext,
    run: &WorkingRun,
    s3_key: &str,
    index: usize,
    moment: &ClipMoment,
    transcript: &[TranscriptSegment],
) -> PipelineResult<String> {
    let layout = ClipLayout::new(run.dir(), index);
    for dir in layout.required_dirs() {
        tokio::fs::create_dir_all(dir).await?;
    }

    // Cut the segment and its audio track
    media::cut_segment(
        run.input_path(),
        layout.segment_path(),
        moment.start,
        moment.end,
    )
    .await?;
    media::extract_audio(layout.segment_path(), layout.audio_path()).await?;

    // Locate the active speaker
    let detection = ctx.detector.detect(run.dir(), &layout).await?;

    // Compose the vertical render
    let info = media::probe_video(layout.segment_path()).await?;
    let runs = media::plan_crop_runs(
        &detection.tracks,
        &detection.scores,
        info.frame_count(),
        info.width,
    );
    media::compose_vertical(
        layout.segment_path(),
        layout.audio_path(),
        layout.vertical_path(),
        &runs,
        &info,
    )
    .await?;

    // Burn captions
    media::burn_subtitles(
        layout.vertical_path(),
        layout.subtitled_path(),
        transcript,
        moment.start,
        moment.end,
    )
    .await?;

    // Publish
    let clip_key = clip_output_key(s3_key, index);
    ctx.storage
        .upload_file(layout.subtitled_path(), &clip_key, "video/mp4")
        .await?;

    info!("Published clip {} to {}", index, clip_key);
    Ok(clip_key)
}
