//! Pipeline orchestration: retries, fallback, and the end-to-end
//! detection flows.

pub mod config;
pub mod error;
pub mod fallback;
pub mod pipeline;
pub mod retry;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use fallback::fallback_detections;
pub use pipeline::DetectionPipeline;
pub use retry::{retry_async, retry_async_if, RetryConfig, RetryResult};
