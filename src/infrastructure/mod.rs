//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with cpal, rodio, ffmpeg, and the Speech-to-Text API.

pub mod audio;
pub mod codec;
pub mod transcription;

// Re-export adapters
pub use audio::{CpalCaptureEngine, CpalDeviceDirectory, RodioPlaybackEngine};
pub use codec::FfmpegTranscoder;
pub use transcription::GoogleSpeechTranscriber;
