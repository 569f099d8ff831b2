//! streamscribe - live websocket audio transcription
//!
//! Connects to a websocket stream of raw call audio, accumulates the frames,
//! periodically sends the buffer to a speech recognition service, and writes
//! the latest transcript into an auto-refreshing HTML page.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod stream;
pub mod stt;
pub mod worker;
pub mod writer;

// Core seams (stream → queue → worker → transcriber → sink)
pub use stream::StreamClient;
pub use stt::cloud::{CloudTranscriber, Credentials};
pub use stt::transcriber::{MockTranscriber, Transcriber};
pub use worker::{QueueItem, TranscribeWorker, WorkerReport};
pub use writer::{CollectorSink, HtmlWriter, TranscriptSink};

// Error handling
pub use error::{Result, ScribeError};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
