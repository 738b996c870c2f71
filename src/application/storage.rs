//! Clip storage path policy
//!
//! Transient captures and import scratch files go to a temp directory;
//! remembered captures get numbered names in the saved-clips directory.
//! Nothing here touches audio data, only where it lands.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Where the coordinator puts new recordings
#[derive(Debug, Clone)]
pub struct ClipStore {
    temp_dir: PathBuf,
    saved_dir: PathBuf,
}

impl ClipStore {
    pub fn new(temp_dir: impl Into<PathBuf>, saved_dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            saved_dir: saved_dir.into(),
        }
    }

    pub fn saved_dir(&self) -> &Path {
        &self.saved_dir
    }

    fn timestamp_millis() -> u128 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0)
    }

    /// Destination for a transient recording
    pub fn temp_clip_path(&self) -> PathBuf {
        self.temp_dir
            .join(format!("voicematch-{}.wav", Self::timestamp_millis()))
    }

    /// Scratch destination for an imported file that needs transcoding
    pub fn temp_import_path(&self) -> PathBuf {
        self.temp_dir
            .join(format!("voicematch-import-{}.wav", Self::timestamp_millis()))
    }

    /// Destination for a remembered recording: the next free numbered
    /// slot in the saved-clips directory.
    pub fn next_saved_path(&self) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.saved_dir)?;
        let existing = std::fs::read_dir(&self.saved_dir)?.count();

        let mut index = existing + 1;
        loop {
            let candidate = self.saved_dir.join(format!("clip_{}.wav", index));
            if !candidate.exists() {
                return Ok(candidate);
            }
            index += 1;
        }
    }
}
