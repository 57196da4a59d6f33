//! Error types for Svar.

use thiserror::Error;

/// Library-level error type for Svar operations.
#[derive(Error, Debug)]
pub enum SvarError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("Could not extract a video ID from URL: {0}")]
    InvalidUrl(String),

    #[error("No transcript available for this video.")]
    NoTranscript,

    #[error("Error retrieving transcript: {0}")]
    TranscriptFetch(String),

    #[error("Inference API error: {0}")]
    Inference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Svar operations.
pub type Result<T> = std::result::Result<T, SvarError>;
