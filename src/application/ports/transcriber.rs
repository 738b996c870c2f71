//! Transcription port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::clip::AudioData;
use crate::domain::language::LanguageTag;

/// Transcription errors
#[derive(Debug, Clone, Error)]
pub enum TranscriptionError {
    #[error("Speech service unreachable: {0}")]
    Transport(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Could not recognize speech in the audio")]
    Unintelligible,

    #[error("Failed to parse service response: {0}")]
    Parse(String),

    #[error("Speech service error: {0}")]
    Api(String),
}

/// Port for the cloud speech-recognition service
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    /// Transcribe audio data to text.
    ///
    /// # Arguments
    /// * `audio` - The audio bytes and their container type
    /// * `language` - Language tag for the recognizer
    ///
    /// # Returns
    /// The transcript, or an error; a clip the service produced no
    /// transcript for is `Unintelligible`.
    async fn transcribe(
        &self,
        audio: &AudioData,
        language: &LanguageTag,
    ) -> Result<String, TranscriptionError>;
}
