//! Clip container port interface

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::clip::AudioClip;

/// Transcoding and container errors
#[derive(Debug, Clone, Error)]
pub enum TranscodeError {
    #[error("ffmpeg not found. Please install ffmpeg to import or export compressed audio")]
    FfmpegNotFound,

    #[error("Transcoding failed: {0}")]
    Failed(String),

    #[error("Unreadable audio container: {0}")]
    FileFormat(String),

    #[error("File error: {0}")]
    Io(String),
}

/// Port for reading, importing, and exporting clip containers
#[async_trait]
pub trait ClipCodec: Send + Sync {
    /// Read a WAV container's header and return a clip reference
    /// carrying its format and duration.
    async fn probe(&self, path: &Path) -> Result<AudioClip, TranscodeError>;

    /// Transcode a compressed input into an uncompressed WAV at
    /// `destination` and probe the result.
    async fn import_to_wav(
        &self,
        source: &Path,
        destination: &Path,
    ) -> Result<AudioClip, TranscodeError>;

    /// Re-encode a WAV clip into the lossy format implied by
    /// `destination`'s extension.
    async fn export_lossy(&self, source: &Path, destination: &Path) -> Result<(), TranscodeError>;
}
