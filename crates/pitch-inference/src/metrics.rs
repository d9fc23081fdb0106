//! Inference metrics collection.
//!
//! Standardized counters for monitoring model calls by outcome category.

use metrics::counter;

/// Metric name constants for consistency.
pub mod names {
    /// Total generate requests by outcome.
    pub const REQUESTS_TOTAL: &str = "inference_requests_total";
}

/// Record a completed generate request.
pub fn record_request(outcome: &str) {
    counter!(names::REQUESTS_TOTAL, "outcome" => outcome.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::REQUESTS_TOTAL.contains("inference"));
    }
}
