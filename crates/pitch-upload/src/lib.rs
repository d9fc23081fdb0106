//! Remote file service client for PitchScan.
//!
//! Moves large video payloads to the remote resumable-upload endpoint in
//! bounded sequential chunks, polls for asynchronous readiness and cleans up
//! remote files best-effort.

pub mod chunk;
pub mod client;
pub mod error;
pub mod metrics;
pub mod poll;

pub use chunk::{chunk_spans, ChunkSpan, UploadSession, DEFAULT_CHUNK_SIZE};
pub use client::{FilesClient, DEFAULT_BASE_URL};
pub use error::{UploadError, UploadResult};
pub use poll::PollConfig;
