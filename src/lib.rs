//! VoiceMatch - record, play back, store, and compare short voice clips
//!
//! Capture and playback run as background worker threads under a
//! session coordinator; phrase comparison goes through the Google
//! Cloud Speech-to-Text API.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Value objects (clips, devices, language tags) and the
//!   session state machine
//! - **Application**: The coordinator, comparison and import/export
//!   use cases, and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, rodio, hound,
//!   ffmpeg, Speech-to-Text)
//! - **CLI**: Argument parsing, the interactive session loop, and
//!   output formatting

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
