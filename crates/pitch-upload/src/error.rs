//! Upload and polling error types.

use thiserror::Error;

/// Result type for upload operations.
pub type UploadResult<T> = Result<T, UploadError>;

/// Errors that can occur during upload, polling or deletion.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid asset: {0}")]
    Asset(#[from] pitch_models::AssetError),

    #[error("Declared size {declared} does not match payload size {actual}")]
    SizeMismatch { declared: u64, actual: u64 },

    #[error("Upload initiation returned {status}: {body}")]
    InitFailed { status: u16, body: String },

    #[error("Upload endpoint did not return a session URL")]
    MissingSessionUrl,

    #[error("Chunk at offset {offset} rejected with status {status}")]
    ChunkFailed { offset: u64, status: u16 },

    #[error("Finalize response carried no file handle")]
    MissingFileHandle,

    #[error("Remote processing failed for {0}")]
    Processing(String),

    #[error("Status check returned {status}")]
    StatusCheck { status: u16 },

    #[error("File {name} not active after {waited_secs}s")]
    PollTimeout { name: String, waited_secs: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UploadError {
    /// Whether a whole-upload restart could plausibly succeed.
    ///
    /// Protocol and configuration mismatches are fatal; transport-level chunk
    /// failures and remote processing hiccups are worth another attempt at
    /// the orchestrator level.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            UploadError::ChunkFailed { .. }
                | UploadError::Processing(_)
                | UploadError::StatusCheck { .. }
                | UploadError::PollTimeout { .. }
                | UploadError::Http(_)
        )
    }
}
