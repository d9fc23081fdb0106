//! Server-side file handles returned by the remote file service.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Processing state of an uploaded file.
///
/// The remote service reports `PROCESSING` (sometimes `PENDING`) until the
/// file is usable. Unrecognized values deserialize as `Processing` so a new
/// server-side state never becomes a fatal parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    Active,
    Failed,
    // The catch-all variant must come last for the serde derive.
    #[serde(alias = "PENDING", other)]
    Processing,
}

impl Default for FileState {
    fn default() -> Self {
        Self::Processing
    }
}

/// Handle to a successfully uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// Opaque identifier (e.g. "files/abc-123")
    pub name: String,
    /// URI used to reference the file in inference requests
    pub uri: String,
    /// MIME type recorded by the service
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Current processing state
    #[serde(default)]
    pub state: FileState,
}

impl RemoteFile {
    /// Whether the file is ready to be referenced by inference calls.
    pub fn is_active(&self) -> bool {
        self.state == FileState::Active
    }
}
