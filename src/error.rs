//! Error types for Audio Dojo

use thiserror::Error;

/// Result type alias for Audio Dojo operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Audio Dojo
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (missing credential, bad base URL, ...)
    #[error("configuration error: {0}")]
    Config(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing error
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
}
