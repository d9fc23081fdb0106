//! Multimodal inference for PitchScan: model client, structured-response
//! extraction and detection validation.

pub mod client;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod prompt;
pub mod validate;

pub use client::{classify_status, GeminiClient, Part, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::{InferenceError, InferenceResult};
pub use extract::{extract_json, Strategy, STRATEGIES};
pub use prompt::{detection_prompt, performance_prompt};
pub use validate::{
    normalize_detections, NormalizeOptions, DEFAULT_MIN_CONFIDENCE, PERMISSIVE_MIN_CONFIDENCE,
};
