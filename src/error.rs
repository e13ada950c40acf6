//! Error types for knowhow.

use std::fmt;
use thiserror::Error;

/// Whether a provider failure is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Network hiccup, rate limit or server-side error.
    Transient,
    /// Malformed input, bad credentials, unexpected response shape.
    Fatal,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderErrorKind::Transient => write!(f, "transient"),
            ProviderErrorKind::Fatal => write!(f, "fatal"),
        }
    }
}

/// Library-level error type for knowhow operations.
#[derive(Error, Debug)]
pub enum KnowhowError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding provider error ({kind}): {message}")]
    Embedding {
        kind: ProviderErrorKind,
        message: String,
    },

    #[error("Embedding batch {batch} failed after {attempts} attempt(s): {source}")]
    EmbeddingBatch {
        batch: usize,
        attempts: u32,
        #[source]
        source: Box<KnowhowError>,
    },

    #[error("Query embedding failed after {attempts} attempt(s): {source}")]
    EmbeddingQuery {
        attempts: u32,
        #[source]
        source: Box<KnowhowError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl KnowhowError {
    /// Shorthand for a retryable provider failure.
    pub fn transient(message: impl Into<String>) -> Self {
        KnowhowError::Embedding {
            kind: ProviderErrorKind::Transient,
            message: message.into(),
        }
    }

    /// Shorthand for a non-retryable provider failure.
    pub fn fatal(message: impl Into<String>) -> Self {
        KnowhowError::Embedding {
            kind: ProviderErrorKind::Fatal,
            message: message.into(),
        }
    }

    /// True when retrying the same call might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            KnowhowError::Embedding {
                kind: ProviderErrorKind::Transient,
                ..
            }
        )
    }
}

/// Result type alias for knowhow operations.
pub type Result<T> = std::result::Result<T, KnowhowError>;
