//! End-to-end detection pipeline.
//!
//! One parameterized control flow serves every call site: the prompt,
//! confidence floor and frame source are the injected parameters, and the
//! retry/fallback orchestration around the poller and the model client is
//! shared. Clients are constructed once at the composition root and passed
//! in; there is no process-wide singleton.

use std::path::Path;

use tracing::{info, warn};

use pitch_inference::{
    detection_prompt, extract_json, normalize_detections, performance_prompt, GeminiClient,
    InferenceError, NormalizeOptions, Part,
};
use pitch_media::{extract_frame, midpoint_timestamp, probe_video, sample_timestamps};
use pitch_models::{DetectionResultSet, MediaAsset, RemoteFile};
use pitch_upload::{FilesClient, UploadError};

use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::fallback::fallback_detections;
use crate::retry::{retry_async_if, RetryConfig, RetryResult};

/// Parameters of one inference invocation.
struct InferenceTask {
    prompt: String,
    min_confidence: f64,
    timestamp_seconds: f64,
}

/// The media-upload and AI-inference pipeline.
pub struct DetectionPipeline {
    files: FilesClient,
    model: GeminiClient,
    config: PipelineConfig,
}

impl DetectionPipeline {
    /// Assemble the pipeline from its clients.
    pub fn new(files: FilesClient, model: GeminiClient, config: PipelineConfig) -> Self {
        Self {
            files,
            model,
            config,
        }
    }

    /// Detect players across a full match video.
    ///
    /// Uploads the payload in chunks, waits for remote processing, runs
    /// inference against the uploaded file and deletes it best-effort
    /// afterwards, whatever the inference outcome.
    pub async fn detect_players_in_video(
        &self,
        data: &[u8],
        display_name: &str,
        mime_type: &str,
    ) -> PipelineResult<DetectionResultSet> {
        let asset = MediaAsset::new(display_name, mime_type, data.len() as u64);
        let file = self.upload_and_await(&asset, data).await?;

        let task = InferenceTask {
            prompt: detection_prompt(),
            min_confidence: self.config.min_confidence,
            timestamp_seconds: 0.0,
        };
        let mime = file
            .mime_type
            .clone()
            .unwrap_or_else(|| asset.mime_type.clone());
        let parts = vec![Part::file(file.uri.clone(), mime)];

        let result = self.infer_with_fallback(parts, &task).await;

        // The primary outcome is already determined; cleanup never masks it.
        self.files.delete_file(&file.name).await;
        result
    }

    /// Detect players in the representative frame of a local video file.
    pub async fn detect_players_in_file(
        &self,
        path: impl AsRef<Path>,
    ) -> PipelineResult<DetectionResultSet> {
        let path = path.as_ref();
        let video = probe_video(path).await?;
        let timestamp = midpoint_timestamp(video.duration, self.config.frame_ratio);
        let frame = extract_frame(path, timestamp, video.duration).await?;

        let task = InferenceTask {
            prompt: detection_prompt(),
            min_confidence: self.config.min_confidence,
            timestamp_seconds: timestamp,
        };
        let parts = vec![Part::inline_image(&frame.image_bytes, "image/jpeg")];
        self.infer_with_fallback(parts, &task).await
    }

    /// Track one player, by jersey number, across sampled frames.
    ///
    /// Frames are sampled at evenly spaced interior timestamps with a
    /// permissive confidence floor; per-frame results merge into one set.
    /// Seeks are sequenced, one decode at a time.
    pub async fn analyze_player_performance(
        &self,
        path: impl AsRef<Path>,
        jersey_number: &str,
    ) -> PipelineResult<DetectionResultSet> {
        let path = path.as_ref();
        let video = probe_video(path).await?;
        let samples = self.config.frame_samples.max(1);
        let timestamps = sample_timestamps(video.duration, samples);

        let mut merged: Option<DetectionResultSet> = None;
        let mut last_error: Option<InferenceError> = None;

        for timestamp in timestamps {
            // A corrupt video will not become decodable on retry.
            let frame = extract_frame(path, timestamp, video.duration).await?;

            let task = InferenceTask {
                prompt: performance_prompt(jersey_number),
                min_confidence: self.config.performance_min_confidence,
                timestamp_seconds: timestamp,
            };
            let parts = vec![Part::inline_image(&frame.image_bytes, "image/jpeg")];

            match self.infer_with_retry(parts, &task).await {
                RetryResult::Success(set) => match merged.as_mut() {
                    Some(acc) => acc.merge(set),
                    None => merged = Some(set),
                },
                RetryResult::Failed { error, attempts } => {
                    warn!(
                        "Frame at {:.1}s failed after {} attempt(s) ({}), continuing",
                        timestamp,
                        attempts,
                        error.category()
                    );
                    last_error = Some(error);
                }
            }
        }

        match merged {
            Some(set) => Ok(set),
            None if self.config.fallback_enabled => {
                warn!("Every sampled frame failed; returning degraded fallback");
                Ok(fallback_detections(midpoint_timestamp(
                    video.duration,
                    self.config.frame_ratio,
                )))
            }
            None => Err(last_error.unwrap_or(InferenceError::NoCandidate).into()),
        }
    }

    /// Upload with whole-attempt restarts, then wait for the file to
    /// become active. Poller exhaustion surfaces to the caller.
    async fn upload_and_await(&self, asset: &MediaAsset, data: &[u8]) -> PipelineResult<RemoteFile> {
        let upload_config = RetryConfig::new("upload")
            .with_max_retries(self.config.upload_max_retries)
            .with_base_delay(self.config.retry_base_delay);
        let file = retry_async_if(
            &upload_config,
            || self.files.upload(asset, data),
            UploadError::is_retryable,
        )
        .await
        .into_result()?;

        info!("Uploaded {} as {}", asset.display_name, file.name);
        if file.is_active() {
            return Ok(file);
        }

        let poll_config = RetryConfig::new("readiness-wait")
            .with_max_retries(self.config.poll_max_retries)
            .with_base_delay(self.config.retry_base_delay);
        let poll_outcome = retry_async_if(
            &poll_config,
            || self.files.wait_until_active(&file.name, &self.config.poll),
            UploadError::is_retryable,
        )
        .await
        .into_result();

        match poll_outcome {
            Ok(active) => Ok(active),
            Err(e) => {
                // The handle exists; clean it up before surfacing the failure.
                self.files.delete_file(&file.name).await;
                Err(e.into())
            }
        }
    }

    /// One inference attempt: generate, extract, normalize.
    async fn infer(
        &self,
        parts: Vec<Part>,
        task: &InferenceTask,
    ) -> Result<DetectionResultSet, InferenceError> {
        let text = self.model.generate(parts, &task.prompt).await?;
        let value = extract_json(&text)?;
        let options = NormalizeOptions::default()
            .with_min_confidence(task.min_confidence)
            .with_timestamp(task.timestamp_seconds);
        normalize_detections(&value, &options)
    }

    /// Inference with bounded retries; non-retryable categories (auth,
    /// quota, safety, malformed request) end the loop immediately.
    async fn infer_with_retry(
        &self,
        parts: Vec<Part>,
        task: &InferenceTask,
    ) -> RetryResult<DetectionResultSet, InferenceError> {
        let retry_config = RetryConfig::new("inference")
            .with_max_retries(self.config.inference_max_retries)
            .with_base_delay(self.config.retry_base_delay);
        retry_async_if(
            &retry_config,
            || self.infer(parts.clone(), task),
            InferenceError::is_retryable,
        )
        .await
    }

    /// Inference that degrades to the deterministic fallback on exhaustion.
    async fn infer_with_fallback(
        &self,
        parts: Vec<Part>,
        task: &InferenceTask,
    ) -> PipelineResult<DetectionResultSet> {
        match self.infer_with_retry(parts, task).await {
            RetryResult::Success(set) => Ok(set),
            RetryResult::Failed { error, attempts } => {
                if self.config.fallback_enabled {
                    warn!(
                        "Inference exhausted after {} attempt(s) ({}); returning degraded fallback",
                        attempts,
                        error.category()
                    );
                    Ok(fallback_detections(task.timestamp_seconds))
                } else {
                    Err(error.into())
                }
            }
        }
    }
}
