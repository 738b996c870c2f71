//! FFmpeg-based clip codec adapter
//!
//! Probing reads WAV headers directly; lossy import/export shells out
//! to an ffmpeg subprocess.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use log::debug;
use tokio::process::Command;

use crate::application::ports::{AudioError, ClipCodec, TranscodeError};
use crate::domain::clip::{AudioClip, CAPTURE_FORMAT};
use crate::infrastructure::audio::wav;

/// Codec adapter over an external ffmpeg binary
pub struct FfmpegTranscoder;

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self
    }

    /// Args to decode any input into the session's WAV format
    fn import_args(source: &Path, destination: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            source.to_string_lossy().to_string(),
            "-ar".to_string(),
            CAPTURE_FORMAT.sample_rate.to_string(),
            "-ac".to_string(),
            CAPTURE_FORMAT.channels.to_string(),
            "-c:a".to_string(),
            "pcm_s16le".to_string(),
            "-y".to_string(),
            destination.to_string_lossy().to_string(),
        ]
    }

    /// Args to re-encode a WAV clip as MP3
    fn export_args(source: &Path, destination: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            source.to_string_lossy().to_string(),
            "-c:a".to_string(),
            "libmp3lame".to_string(),
            "-q:a".to_string(),
            "2".to_string(),
            "-y".to_string(),
            destination.to_string_lossy().to_string(),
        ]
    }

    async fn run_ffmpeg(args: Vec<String>) -> Result<(), TranscodeError> {
        debug!("ffmpeg {}", args.join(" "));
        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscodeError::FfmpegNotFound
                } else {
                    TranscodeError::Io(e.to_string())
                }
            })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| TranscodeError::Io(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscodeError::Failed(
                stderr.lines().last().unwrap_or("unknown error").to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ClipCodec for FfmpegTranscoder {
    async fn probe(&self, path: &Path) -> Result<AudioClip, TranscodeError> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || wav::probe_clip(&path))
            .await
            .map_err(|e| TranscodeError::Io(e.to_string()))?
            .map_err(|e| match e {
                AudioError::FileFormat(msg) => TranscodeError::FileFormat(msg),
                other => TranscodeError::Io(other.to_string()),
            })
    }

    async fn import_to_wav(
        &self,
        source: &Path,
        destination: &Path,
    ) -> Result<AudioClip, TranscodeError> {
        Self::run_ffmpeg(Self::import_args(source, destination)).await?;
        self.probe(destination).await
    }

    async fn export_lossy(&self, source: &Path, destination: &Path) -> Result<(), TranscodeError> {
        Self::run_ffmpeg(Self::export_args(source, destination)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn import_args_force_session_format() {
        let args = FfmpegTranscoder::import_args(
            &PathBuf::from("/in/song.mp3"),
            &PathBuf::from("/out/song.wav"),
        );

        assert!(args.contains(&"44100".to_string()));
        assert!(args.contains(&"pcm_s16le".to_string()));
        let channel_flag = args.iter().position(|a| a == "-ac").unwrap();
        assert_eq!(args[channel_flag + 1], "1");
        assert_eq!(args.last().unwrap(), "/out/song.wav");
    }

    #[test]
    fn export_args_use_mp3_encoder() {
        let args = FfmpegTranscoder::export_args(
            &PathBuf::from("/in/take.wav"),
            &PathBuf::from("/out/take.mp3"),
        );

        assert!(args.contains(&"libmp3lame".to_string()));
        assert_eq!(args.last().unwrap(), "/out/take.mp3");
    }

    #[tokio::test]
    async fn probe_rejects_non_wav_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.wav");
        std::fs::write(&path, b"definitely not riff").unwrap();

        let err = FfmpegTranscoder::new().probe(&path).await.unwrap_err();
        assert!(matches!(err, TranscodeError::FileFormat(_)));
    }
}
