//! Domain error types

use thiserror::Error;

/// Error when parsing a language tag
#[derive(Debug, Clone, Error)]
#[error("Invalid language tag: \"{input}\". Expected a BCP-47 style tag (e.g., en-US, ru-RU)")]
pub struct LanguageTagParseError {
    pub input: String,
}
