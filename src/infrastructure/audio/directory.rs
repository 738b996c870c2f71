//! Audio device enumeration using cpal

use cpal::traits::{DeviceTrait, HostTrait};

use crate::application::ports::{AudioError, DeviceDirectory, DeviceError};
use crate::domain::device::DeviceRef;

/// Device directory backed by the default cpal host
pub struct CpalDeviceDirectory;

impl CpalDeviceDirectory {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CpalDeviceDirectory {
    fn default() -> Self {
        Self::new()
    }
}

/// Max channel counts a device supports in each direction.
/// Enumeration failures count as zero channels in that direction.
fn device_capabilities(device: &cpal::Device) -> (u16, u16) {
    let max_in = device
        .supported_input_configs()
        .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
        .unwrap_or(0);
    let max_out = device
        .supported_output_configs()
        .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
        .unwrap_or(0);
    (max_in, max_out)
}

fn device_ref(device: &cpal::Device) -> Option<DeviceRef> {
    let name = device.name().ok()?;
    let (max_in, max_out) = device_capabilities(device);
    Some(DeviceRef::new(name, max_in, max_out))
}

impl DeviceDirectory for CpalDeviceDirectory {
    fn input_devices(&self) -> Result<Vec<DeviceRef>, DeviceError> {
        let host = cpal::default_host();
        let devices = host
            .devices()
            .map_err(|e| DeviceError::EnumerationFailed(e.to_string()))?;

        Ok(devices
            .filter_map(|d| device_ref(&d))
            .filter(|d| d.is_input_capable())
            .collect())
    }

    fn output_devices(&self) -> Result<Vec<DeviceRef>, DeviceError> {
        let host = cpal::default_host();
        let devices = host
            .devices()
            .map_err(|e| DeviceError::EnumerationFailed(e.to_string()))?;

        Ok(devices
            .filter_map(|d| device_ref(&d))
            .filter(|d| d.is_output_capable())
            .collect())
    }

    fn default_input(&self) -> Option<DeviceRef> {
        let host = cpal::default_host();
        host.default_input_device().and_then(|d| device_ref(&d))
    }

    fn default_output(&self) -> Option<DeviceRef> {
        let host = cpal::default_host();
        host.default_output_device().and_then(|d| device_ref(&d))
    }
}

/// Resolve a selected input device name to a cpal handle, falling back
/// to the system default when no selection was made.
pub fn resolve_input_device(name: Option<&str>) -> Result<cpal::Device, AudioError> {
    let host = cpal::default_host();
    match name {
        None => host.default_input_device().ok_or(AudioError::NoDevice),
        Some(wanted) => host
            .input_devices()
            .map_err(|e| AudioError::DeviceOpen(e.to_string()))?
            .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
            .ok_or_else(|| AudioError::DeviceOpen(format!("Input device not found: {}", wanted))),
    }
}

/// Resolve a selected output device name to a cpal handle, falling
/// back to the system default when no selection was made.
pub fn resolve_output_device(name: Option<&str>) -> Result<cpal::Device, AudioError> {
    let host = cpal::default_host();
    match name {
        None => host.default_output_device().ok_or(AudioError::NoDevice),
        Some(wanted) => host
            .output_devices()
            .map_err(|e| AudioError::DeviceOpen(e.to_string()))?
            .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
            .ok_or_else(|| AudioError::DeviceOpen(format!("Output device not found: {}", wanted))),
    }
}
