//! Upload metrics collection.
//!
//! Standardized counters for monitoring the remote file service:
//! - Chunk transfers and bytes moved
//! - Status polls by outcome

use metrics::counter;

/// Metric name constants for consistency.
pub mod names {
    /// Total chunk PUTs by status.
    pub const CHUNKS_TOTAL: &str = "upload_chunks_total";

    /// Total payload bytes acknowledged by the remote service.
    pub const BYTES_TOTAL: &str = "upload_bytes_total";

    /// Total status polls by observed state.
    pub const POLLS_TOTAL: &str = "upload_polls_total";
}

/// Record a completed chunk transfer.
pub fn record_chunk(status: u16, bytes: u64) {
    counter!(names::CHUNKS_TOTAL, "status" => status.to_string()).increment(1);
    if (200..300).contains(&status) {
        counter!(names::BYTES_TOTAL).increment(bytes);
    }
}

/// Record a status poll.
pub fn record_poll(outcome: &str) {
    counter!(names::POLLS_TOTAL, "outcome" => outcome.to_string()).increment(1);
}
