//! Background transcription worker.
//!
//! Single consumer of the frame queue. Frames are appended to one growing
//! buffer; every time the buffer length crosses the current threshold the
//! whole buffer is transcribed and the threshold moves one step further out.
//! The buffer is never trimmed — each call covers the full session so far.

use crate::error::Result;
use crate::stt::transcriber::Transcriber;
use crate::writer::TranscriptSink;
use crossbeam_channel::Receiver;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace};

/// One item on the frame queue.
///
/// `Shutdown` signals that no more frames will arrive. The queue is FIFO, so
/// every frame enqueued before it is processed first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem {
    Frame(Vec<u8>),
    Shutdown,
}

/// Summary returned when the worker exits cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerReport {
    /// Frames pulled off the queue.
    pub frames: u64,
    /// Total bytes accumulated over the session.
    pub bytes_buffered: usize,
    /// Completed transcription calls.
    pub transcriptions: u64,
}

/// Worker state: transcriber, sink, and the step driving the threshold.
pub struct TranscribeWorker<T, S> {
    transcriber: T,
    sink: S,
    step: usize,
}

impl<T, S> TranscribeWorker<T, S>
where
    T: Transcriber + 'static,
    S: TranscriptSink,
{
    pub fn new(transcriber: T, sink: S, step_bytes: usize) -> Self {
        Self {
            transcriber,
            sink,
            step: step_bytes,
        }
    }

    /// Process queue items until `Shutdown` (or the channel closing).
    ///
    /// Errors from transcription or publishing end the loop immediately and
    /// surface through the return value; there is no retry. The threshold is
    /// advanced only after a successful transcription, so a failed call would
    /// re-trigger at the same point — except the worker is already gone.
    pub fn run(mut self, frames: Receiver<QueueItem>) -> Result<WorkerReport> {
        let mut buffer: Vec<u8> = Vec::new();
        let mut threshold = self.step;
        let mut report = WorkerReport::default();

        while let Ok(item) = frames.recv() {
            match item {
                QueueItem::Shutdown => {
                    debug!("shutdown received");
                    break;
                }
                QueueItem::Frame(data) => {
                    report.frames += 1;
                    buffer.extend_from_slice(&data);
                    trace!(
                        frame_bytes = data.len(),
                        buffered = buffer.len(),
                        threshold,
                        "frame buffered"
                    );

                    if buffer.len() >= threshold {
                        let transcript = self.transcriber.transcribe(&buffer)?;
                        threshold = buffer.len() + self.step;
                        self.sink.publish(&transcript)?;
                        report.transcriptions += 1;
                        debug!(
                            buffered = buffer.len(),
                            next_threshold = threshold,
                            "transcription published"
                        );
                    }
                }
            }
        }

        report.bytes_buffered = buffer.len();
        Ok(report)
    }

    /// Run the worker on a dedicated thread.
    ///
    /// The returned handle yields the worker's result, so an error that kills
    /// the thread is observed by whoever joins it instead of vanishing.
    pub fn spawn(self, frames: Receiver<QueueItem>) -> JoinHandle<Result<WorkerReport>> {
        thread::spawn(move || self.run(frames))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScribeError;
    use crate::stt::transcriber::MockTranscriber;
    use crate::writer::CollectorSink;
    use crossbeam_channel::unbounded;
    use std::sync::{Arc, Mutex};

    /// Transcriber that records the buffer length of every call.
    #[derive(Clone)]
    struct RecordingTranscriber {
        calls: Arc<Mutex<Vec<usize>>>,
    }

    impl RecordingTranscriber {
        fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn call_lengths(&self) -> Vec<usize> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Transcriber for RecordingTranscriber {
        fn transcribe(&self, audio: &[u8]) -> Result<String> {
            self.calls.lock().unwrap().push(audio.len());
            Ok(format!("transcript of {} bytes", audio.len()))
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn frame(len: usize) -> QueueItem {
        QueueItem::Frame(vec![0u8; len])
    }

    #[test]
    fn buffer_accumulates_all_frame_bytes() {
        let (tx, rx) = unbounded();
        let worker = TranscribeWorker::new(MockTranscriber::new(), CollectorSink::new(), 1 << 20);

        tx.send(frame(3)).unwrap();
        tx.send(frame(5)).unwrap();
        tx.send(frame(7)).unwrap();
        tx.send(QueueItem::Shutdown).unwrap();

        let report = worker.run(rx).unwrap();
        assert_eq!(report.frames, 3);
        assert_eq!(report.bytes_buffered, 15);
        // Threshold never reached
        assert_eq!(report.transcriptions, 0);
    }

    #[test]
    fn fires_exactly_when_cumulative_length_crosses_threshold() {
        // step = 4, frames of lengths [1, 2, 1, 1]: cumulative 1, 3, 4, 5.
        // The only crossing is at the third frame (cumulative = 4).
        let (tx, rx) = unbounded();
        let sink = CollectorSink::new();
        let transcriber = RecordingTranscriber::new();
        let worker = TranscribeWorker::new(transcriber.clone(), sink.clone(), 4);

        for len in [1, 2, 1, 1] {
            tx.send(frame(len)).unwrap();
        }
        tx.send(QueueItem::Shutdown).unwrap();

        let report = worker.run(rx).unwrap();
        assert_eq!(report.transcriptions, 1);
        assert_eq!(transcriber.call_lengths(), vec![4]);
        assert_eq!(sink.transcripts().len(), 1);
    }

    #[test]
    fn threshold_advances_to_buffer_length_plus_step() {
        // step = 4: fire at 4 (threshold becomes 8), stay quiet at 7, fire at 8.
        let (tx, rx) = unbounded();
        let transcriber = RecordingTranscriber::new();
        let worker = TranscribeWorker::new(transcriber.clone(), CollectorSink::new(), 4);

        tx.send(frame(4)).unwrap();
        tx.send(frame(3)).unwrap();
        tx.send(frame(1)).unwrap();
        tx.send(QueueItem::Shutdown).unwrap();

        let report = worker.run(rx).unwrap();
        assert_eq!(report.transcriptions, 2);
        assert_eq!(transcriber.call_lengths(), vec![4, 8]);
    }

    #[test]
    fn entire_buffer_is_transcribed_not_just_the_delta() {
        let (tx, rx) = unbounded();
        let transcriber = RecordingTranscriber::new();
        let worker = TranscribeWorker::new(transcriber.clone(), CollectorSink::new(), 2);

        tx.send(frame(2)).unwrap();
        tx.send(frame(2)).unwrap();
        tx.send(QueueItem::Shutdown).unwrap();

        worker.run(rx).unwrap();
        // Second call sees all four bytes, not the new two
        assert_eq!(transcriber.call_lengths(), vec![2, 4]);
    }

    #[test]
    fn shutdown_stops_processing_later_items() {
        let (tx, rx) = unbounded();
        let worker = TranscribeWorker::new(MockTranscriber::new(), CollectorSink::new(), 1 << 20);

        tx.send(frame(1)).unwrap();
        tx.send(QueueItem::Shutdown).unwrap();
        tx.send(frame(1)).unwrap();

        let report = worker.run(rx).unwrap();
        assert_eq!(report.frames, 1);
    }

    #[test]
    fn channel_close_ends_the_worker() {
        let (tx, rx) = unbounded();
        let worker = TranscribeWorker::new(MockTranscriber::new(), CollectorSink::new(), 1 << 20);

        tx.send(frame(2)).unwrap();
        drop(tx);

        let report = worker.run(rx).unwrap();
        assert_eq!(report.frames, 1);
        assert_eq!(report.bytes_buffered, 2);
    }

    #[test]
    fn transcription_error_stops_the_worker() {
        let (tx, rx) = unbounded();
        let sink = CollectorSink::new();
        let worker = TranscribeWorker::new(MockTranscriber::new().with_failure(), sink.clone(), 2);

        tx.send(frame(2)).unwrap();
        tx.send(QueueItem::Shutdown).unwrap();

        let err = worker.run(rx).unwrap_err();
        assert!(matches!(err, ScribeError::Transcription { .. }));
        // Nothing was published
        assert!(sink.transcripts().is_empty());
    }

    #[test]
    fn spawned_worker_reports_through_the_join_handle() {
        let (tx, rx) = unbounded();
        let sink = CollectorSink::new();
        let worker =
            TranscribeWorker::new(MockTranscriber::new().with_response("live"), sink.clone(), 4);

        let handle = worker.spawn(rx);

        tx.send(frame(5)).unwrap();
        tx.send(QueueItem::Shutdown).unwrap();

        let report = handle.join().unwrap().unwrap();
        assert_eq!(report.frames, 1);
        assert_eq!(report.transcriptions, 1);
        assert_eq!(sink.latest().as_deref(), Some("live"));
    }
}
