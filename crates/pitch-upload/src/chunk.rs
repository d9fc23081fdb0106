//! Chunk arithmetic and upload session state.

/// Default chunk size: 64 MiB.
pub const DEFAULT_CHUNK_SIZE: u64 = 64 * 1024 * 1024;

/// One contiguous byte range of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    /// Starting byte offset within the payload
    pub offset: u64,
    /// Number of bytes in this chunk
    pub len: u64,
    /// Whether this chunk carries the finalize command
    pub is_last: bool,
}

/// Split a payload into sequential chunk spans.
///
/// Offsets are contiguous and strictly increasing; exactly the last span is
/// flagged final. A payload no larger than `chunk_size` yields a single span.
pub fn chunk_spans(total: u64, chunk_size: u64) -> Vec<ChunkSpan> {
    assert!(chunk_size > 0, "chunk_size must be positive");
    if total == 0 {
        return Vec::new();
    }

    let count = total.div_ceil(chunk_size);
    (0..count)
        .map(|i| {
            let offset = i * chunk_size;
            ChunkSpan {
                offset,
                len: chunk_size.min(total - offset),
                is_last: i + 1 == count,
            }
        })
        .collect()
}

/// In-progress resumable transfer.
///
/// Owned exclusively by one upload call; `bytes_sent` advances only after a
/// successful chunk acknowledgment and the session is finalized exactly once.
#[derive(Debug)]
pub struct UploadSession {
    /// Session-scoped upload URL returned by the initiation request
    pub upload_url: String,
    pub bytes_sent: u64,
    pub finalized: bool,
}

impl UploadSession {
    pub fn new(upload_url: String) -> Self {
        Self {
            upload_url,
            bytes_sent: 0,
            finalized: false,
        }
    }

    /// Record a successful chunk acknowledgment.
    pub fn ack(&mut self, span: &ChunkSpan) {
        debug_assert_eq!(self.bytes_sent, span.offset, "chunks must be sequential");
        debug_assert!(!self.finalized, "session already finalized");
        self.bytes_sent += span.len;
        if span.is_last {
            self.finalized = true;
        }
    }
}
