//! Error types for streamscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribeError {
    // Startup errors — fatal before any connection is made
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Credentials file not found at {path}")]
    CredentialsNotFound { path: String },

    #[error("Failed to parse credentials: {message}")]
    CredentialsInvalid { message: String },

    #[error("Invalid channel identifier: {message}")]
    InvalidChannelId { message: String },

    // Connection errors — logged, not retried
    #[error("Websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    // Transcription errors — propagated unmodified, no retry
    #[error("Speech request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Speech service rejected the request ({status}): {message}")]
    SpeechApi { status: u16, message: String },

    #[error("Transcription failed: {message}")]
    Transcription { message: String },

    // Write errors and general I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ScribeError>;
