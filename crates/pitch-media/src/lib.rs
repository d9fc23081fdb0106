//! FFmpeg CLI wrapper: video probing and frame sampling for PitchScan.

pub mod error;
pub mod frame;
pub mod probe;

pub use error::{MediaError, MediaResult};
pub use frame::{
    extract_frame, extract_frames, midpoint_timestamp, sample_timestamps, FrameSample,
    DEFAULT_FRAME_RATIO,
};
pub use probe::{get_duration, probe_video, VideoInfo};
