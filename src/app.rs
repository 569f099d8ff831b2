//! Application composition root.
//!
//! Wires the stream client, the frame queue, the transcription worker, and
//! the output writer together: connect → buffer → transcribe → publish.

use crate::config::Config;
use crate::error::{Result, ScribeError};
use crate::stream::StreamClient;
use crate::stt::cloud::{CloudTranscriber, Credentials};
use crate::stt::transcriber::Transcriber;
use crate::worker::{QueueItem, TranscribeWorker};
use crate::writer::{HtmlWriter, TranscriptSink};
use crossbeam_channel::unbounded;
use tracing::{debug, error, info};

/// Run the demo with the real cloud transcriber and HTML output.
///
/// Startup errors (credentials, output directory) abort before any
/// connection is made.
pub async fn run(config: Config, channel_id: String) -> Result<()> {
    let credentials = Credentials::load(&config.speech.credentials_path())?;

    let writer = HtmlWriter::new(config.output.path());
    writer.prepare()?;
    debug!(path = %writer.path().display(), "output page ready");

    // The speech client is blocking (it lives on the worker thread), so it
    // must not be constructed on a runtime thread.
    let speech = config.speech.clone();
    let transcriber =
        tokio::task::spawn_blocking(move || CloudTranscriber::new(&speech, &credentials))
            .await
            .map_err(|_| ScribeError::Other("failed to initialize the speech client".to_string()))??;
    debug!(
        service = transcriber.name(),
        endpoint = %config.speech.endpoint,
        language = %config.speech.language,
        "speech client ready"
    );

    run_session(&config, channel_id, transcriber, writer).await
}

/// Run one streaming session with the given transcriber and sink.
///
/// The worker runs on its own thread with a blocking queue; the websocket
/// receive loop runs here, raced against Ctrl-C. However the receive loop
/// ends — clean close, transport error, interrupt — shutdown is the same:
/// enqueue `Shutdown`, then join the worker so every queued frame is drained
/// before the process exits.
pub async fn run_session<T, S>(
    config: &Config,
    channel_id: String,
    transcriber: T,
    sink: S,
) -> Result<()>
where
    T: Transcriber + 'static,
    S: TranscriptSink,
{
    let (frames_tx, frames_rx) = unbounded();

    let worker = TranscribeWorker::new(transcriber, sink, config.buffer.step_bytes);
    let worker_handle = worker.spawn(frames_rx);

    let mut client = StreamClient::new(
        config.stream.endpoint.clone(),
        config.stream.subprotocol.clone(),
        channel_id,
    );

    tokio::select! {
        result = client.run(&frames_tx) => {
            if let Err(e) = result {
                error!(error = %e, "stream connection failed");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupt received, shutting down");
        }
    }

    // No more frames will arrive. The queue is FIFO, so the worker drains
    // everything already enqueued before it sees the shutdown marker.
    if frames_tx.send(QueueItem::Shutdown).is_err() {
        debug!("worker already stopped");
    }
    debug!("waiting for the transcription worker to drain");

    match worker_handle.join() {
        Ok(Ok(report)) => {
            debug!(
                frames = report.frames,
                bytes = report.bytes_buffered,
                transcriptions = report.transcriptions,
                "worker finished"
            );
            Ok(())
        }
        Ok(Err(e)) => {
            error!(error = %e, "transcription worker failed");
            Err(e)
        }
        Err(_) => Err(ScribeError::Other(
            "transcription worker panicked".to_string(),
        )),
    }
}
