//! Frame sampling: timestamp selection and single-frame rasterization.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Default duration ratio for the single representative frame (midpoint).
pub const DEFAULT_FRAME_RATIO: f64 = 0.5;

/// A rasterized still image plus its source timestamp.
///
/// Ephemeral: produced here, consumed immediately by the inference client,
/// never persisted.
#[derive(Debug, Clone)]
pub struct FrameSample {
    pub timestamp_seconds: f64,
    /// JPEG-encoded image bytes
    pub image_bytes: Vec<u8>,
}

/// Select `n` evenly spaced interior timestamps.
///
/// Excludes t=0 and t=duration to avoid black or transition frames.
pub fn sample_timestamps(duration: f64, n: usize) -> Vec<f64> {
    if duration <= 0.0 || n == 0 {
        return Vec::new();
    }
    (1..=n)
        .map(|i| duration * i as f64 / (n + 1) as f64)
        .collect()
}

/// Single representative timestamp at a duration ratio (clamped off the edges).
pub fn midpoint_timestamp(duration: f64, ratio: f64) -> f64 {
    let ratio = ratio.clamp(0.01, 0.99);
    duration * ratio
}

/// Rasterize the frame at `timestamp` into JPEG bytes.
///
/// Each call runs one ffmpeg seek-and-decode; callers sampling multiple
/// timestamps must await each extraction before starting the next, since the
/// decode cursor cannot be seeked concurrently.
pub async fn extract_frame(
    video_path: impl AsRef<Path>,
    timestamp: f64,
    duration: f64,
) -> MediaResult<FrameSample> {
    let video_path = video_path.as_ref();

    if !video_path.exists() {
        return Err(MediaError::FileNotFound(video_path.to_path_buf()));
    }
    if timestamp < 0.0 || timestamp > duration {
        return Err(MediaError::TimestampOutOfRange {
            timestamp,
            duration,
        });
    }

    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

    let dir = tempfile::tempdir()?;
    let frame_path = dir.path().join("frame.jpg");

    debug!(
        "Extracting frame at {:.3}s from {}",
        timestamp,
        video_path.display()
    );

    let output = Command::new("ffmpeg")
        .args(["-y", "-loglevel", "error", "-ss"])
        .arg(format!("{:.3}", timestamp))
        .arg("-i")
        .arg(video_path)
        .args(["-vframes", "1", "-q:v", "3"])
        .arg(&frame_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::decode_failed(
            format!("FFmpeg failed to extract frame at {:.3}s", timestamp),
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
        ));
    }

    let image_bytes = tokio::fs::read(&frame_path).await?;
    if image_bytes.is_empty() {
        return Err(MediaError::decode_failed(
            format!("FFmpeg produced an empty frame at {:.3}s", timestamp),
            None,
        ));
    }

    Ok(FrameSample {
        timestamp_seconds: timestamp,
        image_bytes,
    })
}

/// Extract `n` evenly spaced frames, sequencing seeks one at a time.
pub async fn extract_frames(
    video_path: impl AsRef<Path>,
    duration: f64,
    n: usize,
) -> MediaResult<Vec<FrameSample>> {
    let video_path = video_path.as_ref();
    let mut frames = Vec::with_capacity(n);
    for timestamp in sample_timestamps(duration, n) {
        frames.push(extract_frame(video_path, timestamp, duration).await?);
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_timestamps_evenly_spaced() {
        let ts = sample_timestamps(90.0, 2);
        assert_eq!(ts, vec![30.0, 60.0]);
    }

    #[test]
    fn test_sample_timestamps_excludes_edges() {
        let ts = sample_timestamps(10.0, 4);
        assert_eq!(ts.len(), 4);
        assert!(ts.iter().all(|&t| t > 0.0 && t < 10.0));
    }

    #[test]
    fn test_sample_timestamps_degenerate() {
        assert!(sample_timestamps(0.0, 3).is_empty());
        assert!(sample_timestamps(10.0, 0).is_empty());
    }

    #[test]
    fn test_midpoint_timestamp() {
        assert!((midpoint_timestamp(100.0, 0.5) - 50.0).abs() < 1e-9);
        // Ratio is clamped off the edges
        assert!(midpoint_timestamp(100.0, 0.0) > 0.0);
        assert!(midpoint_timestamp(100.0, 1.0) < 100.0);
    }

    #[tokio::test]
    async fn test_extract_frame_missing_file() {
        let err = extract_frame("/nonexistent/video.mp4", 1.0, 10.0)
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_extract_frame_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.mp4");
        tokio::fs::write(&path, b"stub").await.unwrap();

        let err = extract_frame(&path, 20.0, 10.0).await.unwrap_err();
        assert!(matches!(err, MediaError::TimestampOutOfRange { .. }));
    }
}
