//! Default configuration constants for streamscribe.
//!
//! Shared between the config layer and the CLI so the two never drift apart.

/// Default websocket endpoint for the inbound audio stream.
///
/// The demo expects a local media gateway exposing call audio at this address.
pub const STREAM_ENDPOINT: &str = "ws://localhost:5039/ws";

/// Websocket subprotocol offered during the handshake.
pub const STREAM_SUBPROTOCOL: &str = "stream-channel";

/// Handshake header carrying the caller-supplied channel identifier.
pub const CHANNEL_ID_HEADER: &str = "Channel-ID";

/// Buffer growth (in bytes) between consecutive transcription calls.
///
/// At 16 kHz 16-bit mono, 32 KiB is roughly one second of audio — frequent
/// enough to feel live without hammering the speech API on every frame.
pub const STEP_BYTES: usize = 32 * 1024;

/// Audio sample rate expected by the speech service, in Hz.
pub const SAMPLE_RATE: u32 = 16000;

/// Audio encoding name sent to the speech service.
///
/// Raw 16-bit little-endian linear PCM, single channel. The stream is passed
/// through untouched; no codec work happens on this side.
pub const AUDIO_ENCODING: &str = "linear16";

/// Default recognition language.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Default speech recognition endpoint.
///
/// Placeholder — point this at your speech provider via the config file or
/// `STREAMSCRIBE_SPEECH_ENDPOINT`.
pub const SPEECH_ENDPOINT: &str = "https://speech.example.com/v1/recognize";

/// Timeout for a single recognition round trip, in seconds.
pub const SPEECH_TIMEOUT_SECS: u64 = 120;

/// Directory the output page is written into.
pub const OUTPUT_DIR: &str = "/tmp/streamscribe";

/// File name of the output page inside [`OUTPUT_DIR`].
pub const OUTPUT_FILENAME: &str = "index.html";

/// Text shown on the output page before the first transcription lands.
pub const PLACEHOLDER_TEXT: &str = "Waiting for the transcription to start...";
