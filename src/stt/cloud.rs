//! Cloud speech recognition client.
//!
//! Single-shot recognition over HTTP: the whole accumulated buffer is posted
//! as raw LINEAR16 PCM and the response carries zero or more recognition
//! results, each optionally marked final. Only final results contribute to
//! the transcript; interim results are discarded.

use crate::config::SpeechConfig;
use crate::defaults;
use crate::error::{Result, ScribeError};
use crate::stt::transcriber::Transcriber;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Authentication material for the speech service.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub api_key: String,
}

impl Credentials {
    /// Load credentials from a JSON file.
    ///
    /// A missing or unparseable file is a fatal startup error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScribeError::CredentialsNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ScribeError::Io(e)
            }
        })?;
        let credentials: Credentials =
            serde_json::from_str(&contents).map_err(|e| ScribeError::CredentialsInvalid {
                message: e.to_string(),
            })?;
        if credentials.api_key.is_empty() {
            return Err(ScribeError::CredentialsInvalid {
                message: "api_key must not be empty".to_string(),
            });
        }
        Ok(credentials)
    }
}

#[derive(Debug, Default, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Default, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    is_final: bool,
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Default, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
}

/// Join the best alternative of every final result, one per line.
///
/// The output always starts with a newline; with no final results it is just
/// that newline, which renders as an empty page.
fn collect_final_transcripts(response: &RecognizeResponse) -> String {
    let mut output = String::from("\n");
    for result in response.results.iter().filter(|r| r.is_final) {
        if let Some(best) = result.alternatives.first() {
            output.push_str(&best.transcript);
            output.push('\n');
        }
    }
    output
}

/// Transcriber backed by a remote speech recognition service.
pub struct CloudTranscriber {
    client: reqwest::blocking::Client,
    endpoint: String,
    language: String,
    sample_rate: u32,
}

impl CloudTranscriber {
    /// Build a client for the configured speech service.
    pub fn new(config: &SpeechConfig, credentials: &Credentials) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", credentials.api_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&bearer).map_err(|e| ScribeError::CredentialsInvalid {
                message: e.to_string(),
            })?,
        );

        let client = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            language: config.language.clone(),
            sample_rate: config.sample_rate,
        })
    }
}

impl Transcriber for CloudTranscriber {
    fn transcribe(&self, audio: &[u8]) -> Result<String> {
        debug!(bytes = audio.len(), "sending buffer to the speech service");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[
                ("encoding", defaults::AUDIO_ENCODING.to_string()),
                ("sample_rate", self.sample_rate.to_string()),
                ("language", self.language.clone()),
            ])
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(audio.to_vec())
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .unwrap_or_else(|_| "failed to read error response".to_string());
            return Err(ScribeError::SpeechApi {
                status: status.as_u16(),
                message,
            });
        }

        let recognized: RecognizeResponse = response.json()?;
        debug!(results = recognized.results.len(), "speech response received");

        let output = collect_final_transcripts(&recognized);
        debug!(output = %output.trim_end(), "final output assembled");
        Ok(output)
    }

    fn name(&self) -> &'static str {
        "cloud"
    }
}
