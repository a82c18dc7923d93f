//! Human-readable labels placed in response envelopes.

use serde::Deserialize;
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VocabularyError {
    #[error("failed to read vocabulary file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid vocabulary json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Labels used by the envelope builder. Any subset may be overridden from JSON;
/// omitted keys keep their defaults.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Vocabulary {
    pub bad_request: String,
    pub no_body: String,
    pub bad_fields: String,
    pub request_success: String,
    pub request_error: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            bad_request: "Bad request".to_string(),
            no_body: "No body provided".to_string(),
            bad_fields: "Bad fields provided".to_string(),
            request_success: "Request succeed".to_string(),
            request_error: "Request failed".to_string(),
        }
    }
}

impl Vocabulary {
    /// Parse overrides from a JSON object.
    ///
    /// # Errors
    /// Returns an error on malformed JSON or unknown keys.
    pub fn from_json(json: &str) -> Result<Self, VocabularyError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load overrides from a JSON file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, VocabularyError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| VocabularyError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}
