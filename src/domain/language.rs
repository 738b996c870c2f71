//! Language tag value object

use std::fmt;
use std::str::FromStr;

use super::error::LanguageTagParseError;

/// BCP-47 style language tag passed to the recognition service
/// (e.g., `en-US`, `ru-RU`, `de`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageTag(String);

impl LanguageTag {
    /// Get the tag string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LanguageTag {
    fn default() -> Self {
        Self("en-US".to_string())
    }
}

impl FromStr for LanguageTag {
    type Err = LanguageTagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let valid = !trimmed.is_empty()
            && trimmed.len() <= 35
            && trimmed
                .split('-')
                .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()));

        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(LanguageTagParseError {
                input: s.to_string(),
            })
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
