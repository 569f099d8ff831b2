//! Command-line interface for streamscribe
//!
//! Provides argument parsing using clap derive macros.

use clap::Parser;
use std::path::PathBuf;

/// Live transcription demo: websocket audio stream to an auto-refreshing HTML page
#[derive(Parser, Debug)]
#[command(
    name = "streamscribe",
    version,
    about = "Transcribe a live websocket audio stream into an auto-refreshing HTML page"
)]
pub struct Cli {
    /// Channel identifier sent on the websocket handshake (Channel-ID header)
    #[arg(value_name = "CHANNEL_ID")]
    pub channel_id: String,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Websocket endpoint of the audio stream (e.g., ws://localhost:5039/ws)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Recognition language code (e.g., en-US, de-DE)
    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    /// Directory the output page is written into
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Buffer growth in bytes between transcription calls
    #[arg(long, value_name = "BYTES")]
    pub step_bytes: Option<usize>,

    /// Path to the speech service credentials file
    #[arg(long, value_name = "PATH")]
    pub credentials: Option<PathBuf>,

    /// Suppress output (quiet mode)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose output (-v: trace-level logging)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
