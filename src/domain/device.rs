//! Audio device reference value object

use std::fmt;

/// A reference to an audio hardware device: human-readable name plus
/// channel capabilities. Resolved to a concrete device handle by the
/// worker at start time; never mutated mid-operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRef {
    name: String,
    max_input_channels: u16,
    max_output_channels: u16,
}

impl DeviceRef {
    pub fn new(name: impl Into<String>, max_input_channels: u16, max_output_channels: u16) -> Self {
        Self {
            name: name.into(),
            max_input_channels,
            max_output_channels,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_input_channels(&self) -> u16 {
        self.max_input_channels
    }

    pub fn max_output_channels(&self) -> u16 {
        self.max_output_channels
    }

    pub fn is_input_capable(&self) -> bool {
        self.max_input_channels > 0
    }

    pub fn is_output_capable(&self) -> bool {
        self.max_output_channels > 0
    }
}

impl fmt::Display for DeviceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (in: {}, out: {})",
            self.name, self.max_input_channels, self.max_output_channels
        )
    }
}
