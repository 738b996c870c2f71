//! Audio subsystem adapters: device directory, workers, WAV I/O

pub mod capture;
pub mod directory;
pub mod playback;
pub mod wav;

pub use capture::CpalCaptureEngine;
pub use directory::CpalDeviceDirectory;
pub use playback::RodioPlaybackEngine;
