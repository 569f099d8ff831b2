use crate::error::{Result, ScribeError};
use std::sync::Arc;

/// Trait for speech-to-text transcription.
///
/// This trait allows swapping implementations (real speech service vs mock).
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio buffer to text.
    ///
    /// # Arguments
    /// * `audio` - Raw 16-bit PCM at 16kHz mono
    ///
    /// # Returns
    /// Transcribed text or error. The call blocks for the full round trip.
    fn transcribe(&self, audio: &[u8]) -> Result<String>;

    /// Name of the backing service, for logging.
    fn name(&self) -> &'static str;
}

/// Implement Transcriber for Arc<T> to allow sharing across threads.
impl<T: Transcriber> Transcriber for Arc<T> {
    fn transcribe(&self, audio: &[u8]) -> Result<String> {
        (**self).transcribe(audio)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Mock transcriber for testing
#[derive(Debug, Clone)]
pub struct MockTranscriber {
    response: String,
    should_fail: bool,
}

impl Default for MockTranscriber {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscriber {
    /// Create a new mock transcriber with default settings
    pub fn new() -> Self {
        Self {
            response: "mock transcription".to_string(),
            should_fail: false,
        }
    }

    /// Configure the mock to return a specific response
    pub fn with_response(mut self, response: &str) -> Self {
        self.response = response.to_string();
        self
    }

    /// Configure the mock to fail on transcribe
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

impl Transcriber for MockTranscriber {
    fn transcribe(&self, _audio: &[u8]) -> Result<String> {
        if self.should_fail {
            Err(ScribeError::Transcription {
                message: "mock transcription failure".to_string(),
            })
        } else {
            Ok(self.response.clone())
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_returns_configured_response() {
        let mock = MockTranscriber::new().with_response("hello");
        assert_eq!(mock.transcribe(&[0u8; 16]).unwrap(), "hello");
        assert_eq!(mock.name(), "mock");
    }

    #[test]
    fn mock_failure_propagates() {
        let mock = MockTranscriber::new().with_failure();
        let err = mock.transcribe(&[0u8; 16]).unwrap_err();
        assert!(matches!(err, ScribeError::Transcription { .. }));
    }

    #[test]
    fn arc_wrapper_delegates() {
        let mock = Arc::new(MockTranscriber::new().with_response("shared"));
        assert_eq!(mock.transcribe(&[]).unwrap(), "shared");
    }
}
