//! Media assets accepted for upload.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard upper bound on a single upload (2 GiB), enforced before any network call.
pub const MAX_UPLOAD_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Errors raised by asset validation.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("Asset is empty")]
    Empty,

    #[error("Asset is {size} bytes, exceeding the {max} byte limit")]
    TooLarge { size: u64, max: u64 },

    #[error("Missing MIME type")]
    MissingMimeType,
}

/// A binary payload accepted for upload.
///
/// Created by the caller, consumed once by the upload client, discarded
/// after the upload completes or fails.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MediaAsset {
    /// Human-readable name shown by the remote file service
    pub display_name: String,
    /// MIME type declared to the upload endpoint (e.g. "video/mp4")
    pub mime_type: String,
    /// Payload size in bytes
    pub size_bytes: u64,
}

impl MediaAsset {
    /// Create a new asset descriptor.
    pub fn new(
        display_name: impl Into<String>,
        mime_type: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            mime_type: mime_type.into(),
            size_bytes,
        }
    }

    /// Validate the asset before any network traffic is attempted.
    pub fn validate(&self) -> Result<(), AssetError> {
        if self.size_bytes == 0 {
            return Err(AssetError::Empty);
        }
        if self.size_bytes > MAX_UPLOAD_BYTES {
            return Err(AssetError::TooLarge {
                size: self.size_bytes,
                max: MAX_UPLOAD_BYTES,
            });
        }
        if self.mime_type.is_empty() {
            return Err(AssetError::MissingMimeType);
        }
        Ok(())
    }
}
