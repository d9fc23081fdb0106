//! Shared data models for the PitchScan backend.
//!
//! This crate provides Serde-serializable types for:
//! - Media assets accepted for upload
//! - Remote file handles and their processing states
//! - Player detections and detection result sets

pub mod asset;
pub mod detection;
pub mod remote_file;

// Re-export common types
pub use asset::{AssetError, MediaAsset, MAX_UPLOAD_BYTES};
pub use detection::{Detection, DetectionResultSet, TeamColors, TeamSide};
pub use remote_file::{FileState, RemoteFile};
