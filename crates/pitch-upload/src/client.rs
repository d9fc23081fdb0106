//! Remote file service client: resumable upload, readiness polling, deletion.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use pitch_models::{FileState, MediaAsset, RemoteFile};

use crate::chunk::{chunk_spans, UploadSession, DEFAULT_CHUNK_SIZE};
use crate::error::{UploadError, UploadResult};
use crate::metrics;
use crate::poll::PollConfig;

/// Default base URL of the remote file service.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Session URL response header on the initiation request.
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Client for the remote file service.
pub struct FilesClient {
    http: Client,
    api_key: String,
    base_url: String,
    chunk_size: u64,
}

/// Initiation request body.
#[derive(Debug, Serialize)]
struct StartRequest<'a> {
    file: StartFile<'a>,
}

#[derive(Debug, Serialize)]
struct StartFile<'a> {
    display_name: &'a str,
}

/// Finalize (and status poll) response body.
#[derive(Debug, Deserialize)]
struct FileResponse {
    file: Option<RemoteFile>,
}

impl FilesClient {
    /// Create a new client against the production endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the service base URL (tests point this at a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        assert!(chunk_size > 0, "chunk_size must be positive");
        self.chunk_size = chunk_size;
        self
    }

    /// Upload a payload in sequential chunks and return the remote handle.
    ///
    /// The asset is validated before any network call. Chunks are never sent
    /// concurrently; the remote protocol requires monotonically increasing
    /// offsets. A failed chunk fails the whole attempt; restarting the upload
    /// is the orchestrator's decision, not this client's.
    pub async fn upload(&self, asset: &MediaAsset, data: &[u8]) -> UploadResult<RemoteFile> {
        asset.validate()?;
        if asset.size_bytes != data.len() as u64 {
            return Err(UploadError::SizeMismatch {
                declared: asset.size_bytes,
                actual: data.len() as u64,
            });
        }

        let mut session = self.start_session(asset).await?;
        let spans = chunk_spans(asset.size_bytes, self.chunk_size);
        info!(
            "Uploading {} ({} bytes, {} chunk(s))",
            asset.display_name,
            asset.size_bytes,
            spans.len()
        );

        let mut finalized: Option<RemoteFile> = None;
        for span in &spans {
            let command = if span.is_last {
                "upload, finalize"
            } else {
                "upload"
            };
            let body = data[span.offset as usize..(span.offset + span.len) as usize].to_vec();

            let response = self
                .http
                .put(&session.upload_url)
                .header("X-Goog-Upload-Offset", span.offset.to_string())
                .header("X-Goog-Upload-Command", command)
                .body(body)
                .send()
                .await?;

            let status = response.status().as_u16();
            metrics::record_chunk(status, span.len);
            if !response.status().is_success() {
                return Err(UploadError::ChunkFailed {
                    offset: span.offset,
                    status,
                });
            }

            if span.is_last {
                let parsed: FileResponse = response.json().await?;
                finalized = Some(parsed.file.ok_or(UploadError::MissingFileHandle)?);
            }
            session.ack(span);
            debug!(
                "Chunk at offset {} acknowledged ({}/{} bytes)",
                span.offset, session.bytes_sent, asset.size_bytes
            );
        }

        let file = finalized.ok_or(UploadError::MissingFileHandle)?;
        info!("Upload finalized as {}", file.name);
        Ok(file)
    }

    /// Issue the initiation request and open an upload session.
    async fn start_session(&self, asset: &MediaAsset) -> UploadResult<UploadSession> {
        let url = format!("{}/upload/v1beta/files?key={}", self.base_url, self.api_key);
        let response = self
            .http
            .post(&url)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header(
                "X-Goog-Upload-Header-Content-Length",
                asset.size_bytes.to_string(),
            )
            .header("X-Goog-Upload-Header-Content-Type", &asset.mime_type)
            .json(&StartRequest {
                file: StartFile {
                    display_name: &asset.display_name,
                },
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::InitFailed { status, body });
        }

        // A missing session URL is a protocol or configuration failure, not a
        // transient fault. It is never retried.
        let upload_url = response
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(UploadError::MissingSessionUrl)?;

        Ok(UploadSession::new(upload_url))
    }

    /// Block (without occupying a thread) until the file becomes active.
    ///
    /// Transient status-check failures are logged and polling continues;
    /// flakiness on the status endpoint is not evidence that processing
    /// failed. A `Failed` state or an expired deadline ends the wait.
    pub async fn wait_until_active(
        &self,
        name: &str,
        config: &PollConfig,
    ) -> UploadResult<RemoteFile> {
        let start = Instant::now();
        let mut interval = config.initial_interval;

        loop {
            tokio::time::sleep(interval).await;

            match self.get_file(name).await {
                Ok(file) => match file.state {
                    FileState::Active => {
                        metrics::record_poll("active");
                        info!("File {} is active", name);
                        return Ok(file);
                    }
                    FileState::Failed => {
                        metrics::record_poll("failed");
                        return Err(UploadError::Processing(name.to_string()));
                    }
                    FileState::Processing => {
                        metrics::record_poll("processing");
                        debug!("File {} still processing", name);
                    }
                },
                Err(e) => {
                    metrics::record_poll("error");
                    warn!("Status check for {} failed, continuing: {}", name, e);
                }
            }

            if start.elapsed() >= config.deadline {
                return Err(UploadError::PollTimeout {
                    name: name.to_string(),
                    waited_secs: start.elapsed().as_secs(),
                });
            }
            interval = config.next_interval(interval);
        }
    }

    /// Fetch the current file record.
    async fn get_file(&self, name: &str) -> UploadResult<RemoteFile> {
        let url = format!("{}/v1beta/{}?key={}", self.base_url, name, self.api_key);
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(UploadError::StatusCheck {
                status: response.status().as_u16(),
            });
        }

        // The status endpoint returns the file record directly.
        let file: RemoteFile = response.json().await?;
        Ok(file)
    }

    /// Best-effort deletion of a remote file.
    ///
    /// The primary operation's outcome is already determined when cleanup
    /// runs, so failures here are logged and swallowed.
    pub async fn delete_file(&self, name: &str) {
        let url = format!("{}/v1beta/{}?key={}", self.base_url, name, self.api_key);
        match self.http.delete(&url).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("Deleted remote file {}", name);
            }
            Ok(response) => {
                warn!(
                    "Failed to delete remote file {}: status {}",
                    name,
                    response.status()
                );
            }
            Err(e) => {
                warn!("Failed to delete remote file {}: {}", name, e);
            }
        }
    }
}
