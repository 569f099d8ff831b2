//! Output page writing.
//!
//! The latest transcript is rendered into a minimal HTML page that
//! auto-refreshes every second, so any browser pointed at the file follows
//! the transcription live.

use crate::defaults;
use crate::error::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Page shell around the transcript. No styling; the meta refresh makes the
/// browser re-read the file every second.
const PAGE_TEMPLATE: &str = "<head>\n    <meta http-equiv=\"refresh\" content=\"1\">\n</head>\n<body>\n{transcript}\n</body>\n";

/// Render a transcript into the page template.
///
/// Line breaks become paragraph breaks; everything else is passed through.
fn render_page(transcript: &str) -> String {
    PAGE_TEMPLATE.replace("{transcript}", &transcript.replace('\n', "</p>"))
}

/// Pluggable transcript output handler.
///
/// This trait allows swapping implementations (HTML file vs test collector).
pub trait TranscriptSink: Send + 'static {
    /// Publish a transcript, replacing whatever was published before.
    fn publish(&mut self, transcript: &str) -> Result<()>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str {
        "sink"
    }
}

/// Writes each transcript over the single output page.
///
/// Plain truncate-and-rewrite; a reader hitting the file mid-write may see a
/// partial page, which the 1-second refresh papers over.
pub struct HtmlWriter {
    path: PathBuf,
}

impl HtmlWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the output page.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Create the output directory and write the placeholder page.
    ///
    /// An already-existing directory is fine; any other failure is fatal.
    pub fn prepare(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            match fs::create_dir(dir) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => return Err(e.into()),
            }
        }
        fs::write(&self.path, render_page(defaults::PLACEHOLDER_TEXT))?;
        Ok(())
    }
}

impl TranscriptSink for HtmlWriter {
    fn publish(&mut self, transcript: &str) -> Result<()> {
        fs::write(&self.path, render_page(transcript))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "html"
    }
}

/// Collects published transcripts in memory. For tests.
///
/// Clones share storage, so a handle kept outside the worker sees what the
/// worker published.
#[derive(Debug, Default, Clone)]
pub struct CollectorSink {
    transcripts: Arc<Mutex<Vec<String>>>,
}

impl CollectorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All transcripts published so far, oldest first.
    pub fn transcripts(&self) -> Vec<String> {
        self.transcripts.lock().map(|t| t.clone()).unwrap_or_default()
    }

    /// The most recently published transcript, if any.
    pub fn latest(&self) -> Option<String> {
        self.transcripts
            .lock()
            .ok()
            .and_then(|t| t.last().cloned())
    }
}

impl TranscriptSink for CollectorSink {
    fn publish(&mut self, transcript: &str) -> Result<()> {
        self.transcripts
            .lock()
            .map_err(|_| crate::error::ScribeError::Other("collector sink poisoned".to_string()))?
            .push(transcript.to_string());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}
