//! Phrase comparison use case
//!
//! Transcribes two clips through the recognition service and compares
//! the case-folded transcripts. Pure with respect to session state.

use std::path::Path;

use thiserror::Error;

use crate::domain::clip::{AudioData, AudioMimeType};
use crate::domain::language::LanguageTag;

use super::ports::{SpeechTranscriber, TranscriptionError};

/// Errors from the comparison use case
#[derive(Debug, Clone, Error)]
pub enum CompareError {
    #[error("Speech service unreachable: {0}")]
    Transport(String),

    #[error("Could not recognize speech in {clip}")]
    Unintelligible { clip: String },

    #[error("Comparison failed: {0}")]
    Other(String),
}

/// Whether two clips carry the same phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchVerdict {
    Match,
    NoMatch,
}

/// Comparison result with both transcripts for display
#[derive(Debug, Clone)]
pub struct CompareOutcome {
    pub verdict: MatchVerdict,
    pub transcript_a: String,
    pub transcript_b: String,
}

/// Comparator over the transcription port
pub struct PhraseComparator<T: SpeechTranscriber> {
    transcriber: T,
}

impl<T: SpeechTranscriber> PhraseComparator<T> {
    pub fn new(transcriber: T) -> Self {
        Self { transcriber }
    }

    /// Compare the spoken phrases in two audio files.
    ///
    /// An empty transcript on either side is an `Unintelligible`
    /// error, never a match verdict.
    pub async fn compare(
        &self,
        clip_a: &Path,
        clip_b: &Path,
        language: &LanguageTag,
    ) -> Result<CompareOutcome, CompareError> {
        let transcript_a = self.transcribe_file(clip_a, language).await?;
        let transcript_b = self.transcribe_file(clip_b, language).await?;

        let folded_a = normalize(&transcript_a);
        let folded_b = normalize(&transcript_b);

        if folded_a.is_empty() {
            return Err(CompareError::Unintelligible {
                clip: display_name(clip_a),
            });
        }
        if folded_b.is_empty() {
            return Err(CompareError::Unintelligible {
                clip: display_name(clip_b),
            });
        }

        let verdict = if folded_a == folded_b {
            MatchVerdict::Match
        } else {
            MatchVerdict::NoMatch
        };

        Ok(CompareOutcome {
            verdict,
            transcript_a,
            transcript_b,
        })
    }

    async fn transcribe_file(
        &self,
        path: &Path,
        language: &LanguageTag,
    ) -> Result<String, CompareError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| CompareError::Other(format!("Cannot read {}: {}", path.display(), e)))?;

        let mime = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("mp3") => AudioMimeType::Mp3,
            _ => AudioMimeType::Wav,
        };

        self.transcriber
            .transcribe(&AudioData::new(bytes, mime), language)
            .await
            .map_err(|e| match e {
                TranscriptionError::Transport(msg) => CompareError::Transport(msg),
                TranscriptionError::RateLimited => CompareError::Transport(e.to_string()),
                TranscriptionError::Unintelligible => CompareError::Unintelligible {
                    clip: display_name(path),
                },
                other => CompareError::Other(other.to_string()),
            })
    }
}

/// Case-fold for comparison
fn normalize(transcript: &str) -> String {
    transcript.trim().to_lowercase()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Transcriber returning canned transcripts keyed by audio bytes
    struct MockTranscriber {
        by_content: HashMap<Vec<u8>, Result<String, TranscriptionError>>,
    }

    impl MockTranscriber {
        fn new() -> Self {
            Self {
                by_content: HashMap::new(),
            }
        }

        fn with(mut self, content: &[u8], result: Result<&str, TranscriptionError>) -> Self {
            self.by_content
                .insert(content.to_vec(), result.map(str::to_string));
            self
        }
    }

    #[async_trait]
    impl SpeechTranscriber for MockTranscriber {
        async fn transcribe(
            &self,
            audio: &AudioData,
            _language: &LanguageTag,
        ) -> Result<String, TranscriptionError> {
            self.by_content
                .get(audio.data())
                .cloned()
                .unwrap_or(Err(TranscriptionError::Unintelligible))
        }
    }

    fn write_clip(dir: &Path, name: &str, content: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn identical_transcripts_match() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_clip(dir.path(), "a.wav", b"aaa");
        let b = write_clip(dir.path(), "b.wav", b"bbb");

        let transcriber = MockTranscriber::new()
            .with(b"aaa", Ok("open the door"))
            .with(b"bbb", Ok("open the door"));
        let comparator = PhraseComparator::new(transcriber);

        let outcome = comparator
            .compare(&a, &b, &LanguageTag::default())
            .await
            .unwrap();
        assert_eq!(outcome.verdict, MatchVerdict::Match);
    }

    #[tokio::test]
    async fn comparison_is_case_folded() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_clip(dir.path(), "a.wav", b"aaa");
        let b = write_clip(dir.path(), "b.wav", b"bbb");

        let transcriber = MockTranscriber::new()
            .with(b"aaa", Ok("Open The Door"))
            .with(b"bbb", Ok("open the door"));
        let comparator = PhraseComparator::new(transcriber);

        let outcome = comparator
            .compare(&a, &b, &LanguageTag::default())
            .await
            .unwrap();
        assert_eq!(outcome.verdict, MatchVerdict::Match);
    }

    #[tokio::test]
    async fn different_phrases_do_not_match() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_clip(dir.path(), "a.wav", b"aaa");
        let b = write_clip(dir.path(), "b.wav", b"bbb");

        let transcriber = MockTranscriber::new()
            .with(b"aaa", Ok("open the door"))
            .with(b"bbb", Ok("close the window"));
        let comparator = PhraseComparator::new(transcriber);

        let outcome = comparator
            .compare(&a, &b, &LanguageTag::default())
            .await
            .unwrap();
        assert_eq!(outcome.verdict, MatchVerdict::NoMatch);
    }

    #[tokio::test]
    async fn empty_transcript_is_unintelligible_not_a_verdict() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_clip(dir.path(), "a.wav", b"aaa");
        let b = write_clip(dir.path(), "b.wav", b"bbb");

        let transcriber = MockTranscriber::new()
            .with(b"aaa", Ok("   "))
            .with(b"bbb", Ok("open the door"));
        let comparator = PhraseComparator::new(transcriber);

        let err = comparator
            .compare(&a, &b, &LanguageTag::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CompareError::Unintelligible { clip } if clip == "a.wav"));
    }

    #[tokio::test]
    async fn service_unintelligible_names_the_clip() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_clip(dir.path(), "a.wav", b"aaa");
        let b = write_clip(dir.path(), "b.wav", b"bbb");

        let transcriber = MockTranscriber::new()
            .with(b"aaa", Ok("open the door"))
            .with(b"bbb", Err(TranscriptionError::Unintelligible));
        let comparator = PhraseComparator::new(transcriber);

        let err = comparator
            .compare(&a, &b, &LanguageTag::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CompareError::Unintelligible { clip } if clip == "b.wav"));
    }

    #[tokio::test]
    async fn transport_errors_classified() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_clip(dir.path(), "a.wav", b"aaa");
        let b = write_clip(dir.path(), "b.wav", b"bbb");

        let transcriber =
            MockTranscriber::new().with(b"aaa", Err(TranscriptionError::Transport("down".into())));
        let comparator = PhraseComparator::new(transcriber);

        let err = comparator
            .compare(&a, &b, &LanguageTag::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CompareError::Transport(_)));
    }

    #[tokio::test]
    async fn missing_file_is_other() {
        let dir = tempfile::tempdir().unwrap();
        let b = write_clip(dir.path(), "b.wav", b"bbb");

        let comparator = PhraseComparator::new(MockTranscriber::new());
        let err = comparator
            .compare(&dir.path().join("missing.wav"), &b, &LanguageTag::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CompareError::Other(_)));
    }
}
