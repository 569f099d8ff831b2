use crate::defaults;
use crate::error::{Result, ScribeError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub stream: StreamConfig,
    pub buffer: BufferConfig,
    pub speech: SpeechConfig,
    pub output: OutputConfig,
}

/// Inbound audio stream configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamConfig {
    pub endpoint: String,
    pub subprotocol: String,
}

/// Accumulation buffer configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BufferConfig {
    pub step_bytes: usize,
}

/// Speech recognition service configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SpeechConfig {
    pub endpoint: String,
    pub language: String,
    pub sample_rate: u32,
    /// Path to the JSON credentials file. Defaults to
    /// `~/.config/streamscribe/credentials.json` when unset.
    pub credentials: Option<PathBuf>,
    pub timeout_secs: u64,
}

/// Output page configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub filename: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::STREAM_ENDPOINT.to_string(),
            subprotocol: defaults::STREAM_SUBPROTOCOL.to_string(),
        }
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            step_bytes: defaults::STEP_BYTES,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::SPEECH_ENDPOINT.to_string(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
            sample_rate: defaults::SAMPLE_RATE,
            credentials: None,
            timeout_secs: defaults::SPEECH_TIMEOUT_SECS,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(defaults::OUTPUT_DIR),
            filename: defaults::OUTPUT_FILENAME.to_string(),
        }
    }
}

impl SpeechConfig {
    /// Resolve the credentials file path, falling back to the default location.
    pub fn credentials_path(&self) -> PathBuf {
        self.credentials.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("streamscribe")
                .join("credentials.json")
        })
    }
}

impl OutputConfig {
    /// Full path of the output page.
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file is missing or contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScribeError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ScribeError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't exist
    ///
    /// Only falls back to defaults when the file is missing; invalid TOML is
    /// still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(ScribeError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - STREAMSCRIBE_STREAM_ENDPOINT → stream.endpoint
    /// - STREAMSCRIBE_SPEECH_ENDPOINT → speech.endpoint
    /// - STREAMSCRIBE_LANGUAGE → speech.language
    /// - STREAMSCRIBE_CREDENTIALS → speech.credentials
    /// - STREAMSCRIBE_OUTPUT_DIR → output.directory
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(endpoint) = std::env::var("STREAMSCRIBE_STREAM_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.stream.endpoint = endpoint;
        }

        if let Ok(endpoint) = std::env::var("STREAMSCRIBE_SPEECH_ENDPOINT")
            && !endpoint.is_empty()
        {
            self.speech.endpoint = endpoint;
        }

        if let Ok(language) = std::env::var("STREAMSCRIBE_LANGUAGE")
            && !language.is_empty()
        {
            self.speech.language = language;
        }

        if let Ok(credentials) = std::env::var("STREAMSCRIBE_CREDENTIALS")
            && !credentials.is_empty()
        {
            self.speech.credentials = Some(PathBuf::from(credentials));
        }

        if let Ok(dir) = std::env::var("STREAMSCRIBE_OUTPUT_DIR")
            && !dir.is_empty()
        {
            self.output.directory = PathBuf::from(dir);
        }

        self
    }

    /// Validate that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.stream.endpoint.is_empty() {
            return Err(ScribeError::ConfigInvalidValue {
                key: "stream.endpoint".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.speech.endpoint.is_empty() {
            return Err(ScribeError::ConfigInvalidValue {
                key: "speech.endpoint".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.speech.language.is_empty() {
            return Err(ScribeError::ConfigInvalidValue {
                key: "speech.language".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.speech.sample_rate == 0 {
            return Err(ScribeError::ConfigInvalidValue {
                key: "speech.sample_rate".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.buffer.step_bytes == 0 {
            return Err(ScribeError::ConfigInvalidValue {
                key: "buffer.step_bytes".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/streamscribe/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("streamscribe")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_streamscribe_env() {
        remove_env("STREAMSCRIBE_STREAM_ENDPOINT");
        remove_env("STREAMSCRIBE_SPEECH_ENDPOINT");
        remove_env("STREAMSCRIBE_LANGUAGE");
        remove_env("STREAMSCRIBE_CREDENTIALS");
        remove_env("STREAMSCRIBE_OUTPUT_DIR");
    }

    #[test]
    fn default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.stream.endpoint, "ws://localhost:5039/ws");
        assert_eq!(config.stream.subprotocol, "stream-channel");

        assert_eq!(config.buffer.step_bytes, 32 * 1024);

        assert_eq!(config.speech.language, "en-US");
        assert_eq!(config.speech.sample_rate, 16000);
        assert_eq!(config.speech.credentials, None);
        assert_eq!(config.speech.timeout_secs, 120);

        assert_eq!(config.output.directory, PathBuf::from("/tmp/streamscribe"));
        assert_eq!(config.output.filename, "index.html");
    }

    #[test]
    fn default_config_validates() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn load_from_toml_file() {
        let toml_content = r#"
            [stream]
            endpoint = "ws://gateway:9000/audio"

            [buffer]
            step_bytes = 4096

            [speech]
            language = "de-DE"
            credentials = "/etc/streamscribe/creds.json"
        "#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.stream.endpoint, "ws://gateway:9000/audio");
        // Unspecified fields keep their defaults
        assert_eq!(config.stream.subprotocol, "stream-channel");
        assert_eq!(config.buffer.step_bytes, 4096);
        assert_eq!(config.speech.language, "de-DE");
        assert_eq!(
            config.speech.credentials,
            Some(PathBuf::from("/etc/streamscribe/creds.json"))
        );
        assert_eq!(config.output.filename, "index.html");
    }

    #[test]
    fn load_missing_file_is_config_not_found() {
        let err = Config::load(Path::new("/nonexistent/streamscribe.toml")).unwrap_err();
        assert!(matches!(err, ScribeError::ConfigFileNotFound { .. }));
    }

    #[test]
    fn load_or_default_falls_back_when_missing() {
        let config = Config::load_or_default(Path::new("/nonexistent/streamscribe.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn load_or_default_rejects_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"stream = not valid toml").unwrap();

        assert!(Config::load_or_default(file.path()).is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_streamscribe_env();

        set_env("STREAMSCRIBE_STREAM_ENDPOINT", "ws://other:1234/ws");
        set_env("STREAMSCRIBE_LANGUAGE", "fr-FR");
        set_env("STREAMSCRIBE_OUTPUT_DIR", "/var/www/live");

        let config = Config::default().with_env_overrides();
        assert_eq!(config.stream.endpoint, "ws://other:1234/ws");
        assert_eq!(config.speech.language, "fr-FR");
        assert_eq!(config.output.directory, PathBuf::from("/var/www/live"));

        clear_streamscribe_env();
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_streamscribe_env();

        set_env("STREAMSCRIBE_LANGUAGE", "");

        let config = Config::default().with_env_overrides();
        assert_eq!(config.speech.language, "en-US");

        clear_streamscribe_env();
    }

    #[test]
    fn validate_rejects_zero_step() {
        let mut config = Config::default();
        config.buffer.step_bytes = 0;

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ScribeError::ConfigInvalidValue { ref key, .. } if key == "buffer.step_bytes"
        ));
    }

    #[test]
    fn validate_rejects_empty_language() {
        let mut config = Config::default();
        config.speech.language = String::new();

        assert!(config.validate().is_err());
    }

    #[test]
    fn output_path_joins_directory_and_filename() {
        let config = Config::default();
        assert_eq!(
            config.output.path(),
            PathBuf::from("/tmp/streamscribe/index.html")
        );
    }

    #[test]
    fn credentials_path_prefers_explicit_setting() {
        let mut config = Config::default();
        config.speech.credentials = Some(PathBuf::from("/opt/creds.json"));
        assert_eq!(
            config.speech.credentials_path(),
            PathBuf::from("/opt/creds.json")
        );
    }
}
