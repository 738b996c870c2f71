//! Clip import and export flows
//!
//! Imports accept WAV directly or transcode MP3 through the codec
//! collaborator; exports copy WAV byte-for-byte, re-encode to MP3, and
//! fall back to a raw copy for unrecognized extensions.

use std::path::Path;

use log::debug;

use crate::domain::clip::AudioClip;

use super::ports::{ClipCodec, TranscodeError};
use super::storage::ClipStore;

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Bring an external audio file into the session's container format.
/// WAV files are probed in place; MP3 is transcoded to a scratch WAV.
pub async fn import_clip(
    codec: &dyn ClipCodec,
    source: &Path,
    store: &ClipStore,
) -> Result<AudioClip, TranscodeError> {
    match extension_of(source).as_deref() {
        Some("wav") => codec.probe(source).await,
        Some("mp3") => {
            let scratch = store.temp_import_path();
            debug!(
                "transcoding {} into {}",
                source.display(),
                scratch.display()
            );
            codec.import_to_wav(source, &scratch).await
        }
        _ => Err(TranscodeError::FileFormat(format!(
            "Unsupported import format: {}",
            source.display()
        ))),
    }
}

/// Write the current clip to `destination`. `.wav` copies the
/// container unmodified, `.mp3` re-encodes, anything else falls back
/// to a raw copy.
pub async fn export_clip(
    codec: &dyn ClipCodec,
    clip: &AudioClip,
    destination: &Path,
) -> Result<(), TranscodeError> {
    match extension_of(destination).as_deref() {
        Some("mp3") => codec.export_lossy(clip.path(), destination).await,
        _ => {
            tokio::fs::copy(clip.path(), destination)
                .await
                .map_err(|e| TranscodeError::Io(e.to_string()))?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clip::CAPTURE_FORMAT;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::time::Duration;

    struct MockCodec;

    #[async_trait]
    impl ClipCodec for MockCodec {
        async fn probe(&self, path: &Path) -> Result<AudioClip, TranscodeError> {
            Ok(AudioClip::new(path, CAPTURE_FORMAT, Duration::from_secs(1)))
        }

        async fn import_to_wav(
            &self,
            _source: &Path,
            destination: &Path,
        ) -> Result<AudioClip, TranscodeError> {
            std::fs::write(destination, b"wav").map_err(|e| TranscodeError::Io(e.to_string()))?;
            Ok(AudioClip::new(
                destination,
                CAPTURE_FORMAT,
                Duration::from_secs(1),
            ))
        }

        async fn export_lossy(
            &self,
            _source: &Path,
            destination: &Path,
        ) -> Result<(), TranscodeError> {
            std::fs::write(destination, b"mp3").map_err(|e| TranscodeError::Io(e.to_string()))?;
            Ok(())
        }
    }

    fn store(dir: &Path) -> ClipStore {
        ClipStore::new(dir, dir.join("saved"))
    }

    fn clip(path: PathBuf) -> AudioClip {
        AudioClip::new(path, CAPTURE_FORMAT, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn wav_import_probes_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("take.wav");
        std::fs::write(&source, b"riff").unwrap();

        let imported = import_clip(&MockCodec, &source, &store(dir.path()))
            .await
            .unwrap();
        assert_eq!(imported.path(), source.as_path());
    }

    #[tokio::test]
    async fn mp3_import_transcodes_to_scratch_wav() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("song.mp3");
        std::fs::write(&source, b"id3").unwrap();

        let imported = import_clip(&MockCodec, &source, &store(dir.path()))
            .await
            .unwrap();
        assert_ne!(imported.path(), source.as_path());
        assert_eq!(imported.path().extension().unwrap(), "wav");
        assert!(imported.path().exists());
    }

    #[tokio::test]
    async fn unknown_import_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("notes.txt");
        std::fs::write(&source, b"hi").unwrap();

        let err = import_clip(&MockCodec, &source, &store(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::FileFormat(_)));
    }

    #[tokio::test]
    async fn wav_export_copies_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("take.wav");
        std::fs::write(&source, b"riff-bytes").unwrap();
        let dest = dir.path().join("out.wav");

        export_clip(&MockCodec, &clip(source), &dest).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"riff-bytes");
    }

    #[tokio::test]
    async fn mp3_export_reencodes() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("take.wav");
        std::fs::write(&source, b"riff").unwrap();
        let dest = dir.path().join("out.mp3");

        export_clip(&MockCodec, &clip(source), &dest).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"mp3");
    }

    #[tokio::test]
    async fn unrecognized_export_extension_falls_back_to_copy() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("take.wav");
        std::fs::write(&source, b"riff-bytes").unwrap();
        let dest = dir.path().join("out.audio");

        export_clip(&MockCodec, &clip(source), &dest).await.unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"riff-bytes");
    }
}
