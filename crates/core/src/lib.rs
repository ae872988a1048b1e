//! Domain building blocks for incident video classification.
//!
//! Holds the closed label set, frame and result types, the narrative table,
//! and the ffprobe/ffmpeg command helpers. Everything here is runtime-agnostic
//! apart from the subprocess helpers in [`ffmpeg`].

pub mod error;
pub mod ffmpeg;
pub mod frame;
pub mod labels;
pub mod narrative;
pub mod probability;
pub mod result;
pub mod video_url;
