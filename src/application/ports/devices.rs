//! Device directory port interface

use thiserror::Error;

use crate::domain::device::DeviceRef;

/// Device enumeration errors
#[derive(Debug, Clone, Error)]
pub enum DeviceError {
    #[error("Failed to enumerate audio devices: {0}")]
    EnumerationFailed(String),
}

/// Port for enumerating audio hardware
pub trait DeviceDirectory: Send + Sync {
    /// All devices with nonzero input channel capability
    fn input_devices(&self) -> Result<Vec<DeviceRef>, DeviceError>;

    /// All devices with nonzero output channel capability
    fn output_devices(&self) -> Result<Vec<DeviceRef>, DeviceError>;

    /// The system default input device, if any
    fn default_input(&self) -> Option<DeviceRef>;

    /// The system default output device, if any
    fn default_output(&self) -> Option<DeviceRef>;
}
