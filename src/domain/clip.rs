//! Audio clip value objects

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Sample layout of a stored clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipFormat {
    pub channels: u16,
    pub bits_per_sample: u16,
    pub sample_rate: u32,
}

/// Fixed capture format: mono, 16-bit signed PCM, 44100 Hz.
/// Policy choice; a future revision may make this configurable.
pub const CAPTURE_FORMAT: ClipFormat = ClipFormat {
    channels: 1,
    bits_per_sample: 16,
    sample_rate: 44100,
};

impl ClipFormat {
    /// Bytes per frame (all channels of one sample instant)
    pub const fn frame_bytes(&self) -> u32 {
        self.channels as u32 * (self.bits_per_sample as u32 / 8)
    }
}

impl fmt::Display for ClipFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channels = match self.channels {
            1 => "mono".to_string(),
            2 => "stereo".to_string(),
            n => format!("{}ch", n),
        };
        write!(
            f,
            "{} {}-bit {} Hz",
            channels, self.bits_per_sample, self.sample_rate
        )
    }
}

/// A stored audio recording or imported file, the unit of
/// playback, recording, and comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    path: PathBuf,
    format: ClipFormat,
    duration: Duration,
}

impl AudioClip {
    /// Create a clip reference for an existing file
    pub fn new(path: impl Into<PathBuf>, format: ClipFormat, duration: Duration) -> Self {
        Self {
            path: path.into(),
            format,
            duration,
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sample layout
    pub fn format(&self) -> ClipFormat {
        self.format
    }

    /// Playback duration
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// File name for display, falling back to the full path
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Supported audio MIME types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AudioMimeType {
    #[default]
    Wav,
    Mp3,
}

impl AudioMimeType {
    /// Get the MIME type string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mp3",
        }
    }

    /// Get the file extension
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
        }
    }
}

impl fmt::Display for AudioMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Value object holding raw audio bytes ready for the recognition service
#[derive(Debug, Clone)]
pub struct AudioData {
    data: Vec<u8>,
    mime_type: AudioMimeType,
}

impl AudioData {
    /// Create AudioData from raw bytes
    pub fn new(data: Vec<u8>, mime_type: AudioMimeType) -> Self {
        Self { data, mime_type }
    }

    /// Get the raw audio data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the MIME type
    pub fn mime_type(&self) -> AudioMimeType {
        self.mime_type
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Encode the audio data as base64
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_format_frame_bytes() {
        assert_eq!(CAPTURE_FORMAT.frame_bytes(), 2);

        let stereo = ClipFormat {
            channels: 2,
            bits_per_sample: 16,
            sample_rate: 44100,
        };
        assert_eq!(stereo.frame_bytes(), 4);
    }

    #[test]
    fn format_display() {
        assert_eq!(CAPTURE_FORMAT.to_string(), "mono 16-bit 44100 Hz");
    }

    #[test]
    fn clip_display_name() {
        let clip = AudioClip::new("/tmp/take.wav", CAPTURE_FORMAT, Duration::from_secs(2));
        assert_eq!(clip.display_name(), "take.wav");
    }

    #[test]
    fn mime_type_strings() {
        assert_eq!(AudioMimeType::Wav.as_str(), "audio/wav");
        assert_eq!(AudioMimeType::Mp3.extension(), "mp3");
    }

    #[test]
    fn to_base64_round_trips() {
        let data = AudioData::new(vec![1, 2, 3, 4], AudioMimeType::Wav);
        use base64::Engine;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(data.to_base64())
            .unwrap();
        assert_eq!(decoded, vec![1, 2, 3, 4]);
    }
}
