//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Backend is unusable (e.g. no API key configured)
    #[error("Translation backend is disabled")]
    Disabled,

    /// A unit or a line does not fit into a single backend call
    #[error("Length exceeds {limit} chars: {text:?}")]
    SizeExceeded {
        limit: usize,
        text: String,
    },

    /// Source language could not be detected with enough confidence
    #[error("Ambiguous source language: {text:?}")]
    AmbiguousLanguage {
        text: String,
    },

    /// Language is outside the supported set
    #[error("Unsupported language {lang:?}: {text:?}")]
    UnsupportedLanguage {
        lang: String,
        text: String,
    },

    /// Provider answered with an explicit error payload
    #[error("{code}: {message} - {text:?}")]
    Backend {
        code: String,
        message: String,
        text: String,
    },

    /// Provider answered with a blank target text
    #[error("{text:?} was translated to empty target text")]
    EmptyTranslation {
        text: String,
    },

    /// Connection-level failure, retried before surfacing
    #[error("Network error: {message}")]
    Network {
        message: String,
    },

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponse {
        message: String,
    },

    /// Malformed suggestion file
    #[error("Suggestion file line {line}: {message}")]
    Suggestion {
        line: usize,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        message: String,
    },

    /// A thread panicked while holding a shared lock
    #[error("Lock poisoned: {message}")]
    LockPoisoned {
        message: String,
    },

    /// Persistent cache error
    #[error("Cache store error: {0}")]
    Store(#[from] redb::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TranslationError {
    /// Whether the failure may disappear if the same call is repeated
    pub fn is_transient(&self) -> bool {
        matches!(self, TranslationError::Network { .. })
    }
}

impl From<config::ConfigError> for TranslationError {
    fn from(err: config::ConfigError) -> Self {
        TranslationError::Config {
            message: err.to_string(),
        }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_network_errors_are_transient() {
        let network = TranslationError::Network {
            message: "connection refused".to_string(),
        };
        assert!(network.is_transient());
        assert!(!TranslationError::Disabled.is_transient());
        assert!(!TranslationError::EmptyTranslation {
            text: "x".to_string()
        }
        .is_transient());
    }

    #[test]
    fn test_size_exceeded_message() {
        let err = TranslationError::SizeExceeded {
            limit: 5000,
            text: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Length exceeds 5000 chars: \"abc\"");
    }
}
