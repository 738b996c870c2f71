//! Google Cloud Speech-to-Text transcriber adapter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{SpeechTranscriber, TranscriptionError};
use crate::domain::clip::{AudioData, AudioMimeType};
use crate::domain::language::LanguageTag;

/// Speech-to-Text API base URL
const API_BASE_URL: &str = "https://speech.googleapis.com";

// Request types for the recognize call

#[derive(Debug, Serialize)]
struct RecognizeRequest {
    config: RecognitionConfig,
    audio: RecognitionAudio,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    encoding: Option<String>,
    language_code: String,
}

#[derive(Debug, Serialize)]
struct RecognitionAudio {
    content: String,
}

// Response types for the recognize call

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    results: Option<Vec<SpeechResult>>,
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct SpeechResult {
    alternatives: Option<Vec<SpeechAlternative>>,
}

#[derive(Debug, Deserialize)]
struct SpeechAlternative {
    transcript: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    message: String,
    status: Option<String>,
    code: Option<i32>,
}

/// Speech-to-Text transcriber
pub struct GoogleSpeechTranscriber {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GoogleSpeechTranscriber {
    /// Create a new transcriber with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: API_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a transcriber against a custom endpoint (tests)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build the API URL
    fn api_url(&self) -> String {
        format!(
            "{}/v1/speech:recognize?key={}",
            self.base_url, self.api_key
        )
    }

    /// Build the request body. WAV input carries its own header, so
    /// the encoding is left for the service to read from the
    /// container; MP3 is named explicitly.
    fn build_request(audio: &AudioData, language: &LanguageTag) -> RecognizeRequest {
        let encoding = match audio.mime_type() {
            AudioMimeType::Wav => None,
            AudioMimeType::Mp3 => Some("MP3".to_string()),
        };

        RecognizeRequest {
            config: RecognitionConfig {
                encoding,
                language_code: language.as_str().to_string(),
            },
            audio: RecognitionAudio {
                content: audio.to_base64(),
            },
        }
    }

    /// Join the top alternative of each result into one transcript
    fn extract_transcript(response: &RecognizeResponse) -> Option<String> {
        let pieces: Vec<&str> = response
            .results
            .as_ref()?
            .iter()
            .filter_map(|r| r.alternatives.as_ref()?.first()?.transcript.as_deref())
            .collect();

        if pieces.is_empty() {
            None
        } else {
            Some(pieces.join(" "))
        }
    }
}

#[async_trait]
impl SpeechTranscriber for GoogleSpeechTranscriber {
    async fn transcribe(
        &self,
        audio: &AudioData,
        language: &LanguageTag,
    ) -> Result<String, TranscriptionError> {
        let url = self.api_url();
        let body = Self::build_request(audio, language);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| TranscriptionError::Transport(e.to_string()))?;

        let status = response.status();

        // Handle HTTP errors
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(TranscriptionError::InvalidApiKey);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TranscriptionError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TranscriptionError::Api(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        // Parse response
        let response: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| TranscriptionError::Parse(e.to_string()))?;

        // Check for API error in response body
        if let Some(error) = response.error {
            return Err(TranscriptionError::Api(error.message));
        }

        // No results means the service could not recognize the audio
        let text = Self::extract_transcript(&response)
            .ok_or(TranscriptionError::Unintelligible)?;

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(TranscriptionError::Unintelligible);
        }

        Ok(trimmed.to_string())
    }
}
