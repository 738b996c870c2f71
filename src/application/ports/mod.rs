//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod codec;
pub mod devices;
pub mod transcriber;
pub mod worker;

// Re-export common types
pub use codec::{ClipCodec, TranscodeError};
pub use devices::{DeviceDirectory, DeviceError};
pub use transcriber::{SpeechTranscriber, TranscriptionError};
pub use worker::{
    AudioError, CaptureEngine, CaptureHandle, EventSender, PlaybackControl, PlaybackEngine,
    PlaybackHandle, WorkerEvent,
};
