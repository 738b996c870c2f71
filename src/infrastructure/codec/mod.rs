//! Clip container adapters

pub mod ffmpeg;

pub use ffmpeg::FfmpegTranscoder;
