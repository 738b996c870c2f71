//! Speech recognition adapters

pub mod google;

pub use google::GoogleSpeechTranscriber;
