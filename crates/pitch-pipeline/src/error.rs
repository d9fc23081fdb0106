//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Upload failed: {0}")]
    Upload(#[from] pitch_upload::UploadError),

    #[error("Media error: {0}")]
    Media(#[from] pitch_media::MediaError),

    #[error("Inference failed: {0}")]
    Inference(#[from] pitch_inference::InferenceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Probable cause category for user-visible failure messages.
    ///
    /// Naming the likely cause (expired credential, quota, network,
    /// unsupported format, content-safety block, timeout) is part of the
    /// contract, not cosmetic.
    pub fn probable_cause(&self) -> &'static str {
        use pitch_inference::InferenceError;
        use pitch_media::MediaError;
        use pitch_upload::UploadError;

        match self {
            Self::Upload(e) => match e {
                UploadError::Asset(_) | UploadError::SizeMismatch { .. } => "unsupported format",
                UploadError::PollTimeout { .. } => "timeout",
                UploadError::Processing(_) => "remote processing failure",
                UploadError::InitFailed { .. } | UploadError::MissingSessionUrl => {
                    "configuration"
                }
                _ => "network",
            },
            Self::Media(e) => match e {
                MediaError::DecodeFailed { .. } | MediaError::InvalidVideo(_) => {
                    "unsupported format"
                }
                _ => "media processing failure",
            },
            Self::Inference(e) => match e {
                InferenceError::Auth { .. } => "expired credential",
                InferenceError::Quota => "quota",
                InferenceError::SafetyBlocked(_) => "content-safety block",
                InferenceError::Timeout => "timeout",
                InferenceError::BadRequest(_) => "configuration",
                InferenceError::NoCandidate
                | InferenceError::Extraction { .. }
                | InferenceError::Schema(_) => "malformed model reply",
                _ => "network",
            },
            Self::Io(_) => "local io failure",
        }
    }
}
