//! Pipeline configuration.

use std::time::Duration;

use pitch_inference::{DEFAULT_MIN_CONFIDENCE, PERMISSIVE_MIN_CONFIDENCE};
use pitch_upload::{PollConfig, DEFAULT_CHUNK_SIZE};

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Chunk size for resumable uploads
    pub chunk_size: u64,
    /// Readiness polling schedule
    pub poll: PollConfig,
    /// Whole-upload restarts on transient failure
    pub upload_max_retries: u32,
    /// Readiness-wait restarts on transient failure
    pub poll_max_retries: u32,
    /// Inference attempts beyond the first
    pub inference_max_retries: u32,
    /// Base delay for linear retry backoff
    pub retry_base_delay: Duration,
    /// Confidence floor for single-frame detection
    pub min_confidence: f64,
    /// Confidence floor for multi-sample performance analysis
    pub performance_min_confidence: f64,
    /// Frames sampled per performance analysis
    pub frame_samples: usize,
    /// Duration ratio of the single representative frame
    pub frame_ratio: f64,
    /// Whether exhausted inference degrades to the synthetic fallback
    pub fallback_enabled: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            poll: PollConfig::default(),
            upload_max_retries: 2,
            poll_max_retries: 2,
            inference_max_retries: 3,
            retry_base_delay: Duration::from_millis(1500),
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            performance_min_confidence: PERMISSIVE_MIN_CONFIDENCE,
            frame_samples: 3,
            frame_ratio: pitch_media::DEFAULT_FRAME_RATIO,
            fallback_enabled: true,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            chunk_size: env_parse("PITCH_CHUNK_SIZE", defaults.chunk_size),
            poll: PollConfig::default().with_deadline(Duration::from_secs(env_parse(
                "PITCH_POLL_DEADLINE_SECS",
                defaults.poll.deadline.as_secs(),
            ))),
            upload_max_retries: env_parse("PITCH_UPLOAD_RETRIES", defaults.upload_max_retries),
            poll_max_retries: env_parse("PITCH_POLL_RETRIES", defaults.poll_max_retries),
            inference_max_retries: env_parse(
                "PITCH_INFERENCE_RETRIES",
                defaults.inference_max_retries,
            ),
            retry_base_delay: Duration::from_millis(env_parse(
                "PITCH_RETRY_BASE_MS",
                defaults.retry_base_delay.as_millis() as u64,
            )),
            min_confidence: env_parse("PITCH_MIN_CONFIDENCE", defaults.min_confidence),
            performance_min_confidence: env_parse(
                "PITCH_PERF_MIN_CONFIDENCE",
                defaults.performance_min_confidence,
            ),
            frame_samples: env_parse("PITCH_FRAME_SAMPLES", defaults.frame_samples),
            frame_ratio: env_parse("PITCH_FRAME_RATIO", defaults.frame_ratio),
            fallback_enabled: env_parse("PITCH_FALLBACK_ENABLED", defaults.fallback_enabled),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = PipelineConfig::default();
        assert!(config.chunk_size > 0);
        assert!(config.inference_max_retries >= 3);
        assert!(config.min_confidence > config.performance_min_confidence);
        assert!(config.fallback_enabled);
    }
}
