//! Websocket client for the inbound audio stream.
//!
//! One outbound connection, identified by the caller-supplied channel id.
//! Every binary frame is forwarded into the worker queue; the receive loop
//! owns the connection until the peer closes it or the transport fails.

use crate::defaults;
use crate::error::{Result, ScribeError};
use crate::worker::QueueItem;
use crossbeam_channel::Sender;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tracing::{debug, trace, warn};

/// Build the handshake request: endpoint URL plus the channel id header and
/// the subprotocol offer.
fn build_request(endpoint: &str, subprotocol: &str, channel_id: &str) -> Result<Request> {
    let mut request = endpoint.into_client_request()?;
    let headers = request.headers_mut();
    headers.insert(
        defaults::CHANNEL_ID_HEADER,
        HeaderValue::from_str(channel_id).map_err(|e| ScribeError::InvalidChannelId {
            message: e.to_string(),
        })?,
    );
    headers.insert(
        "Sec-WebSocket-Protocol",
        HeaderValue::from_str(subprotocol).map_err(|e| ScribeError::Other(e.to_string()))?,
    );
    Ok(request)
}

/// Client for the audio stream websocket.
pub struct StreamClient {
    endpoint: String,
    subprotocol: String,
    channel_id: String,
    bytes_received: u64,
}

impl StreamClient {
    pub fn new(endpoint: String, subprotocol: String, channel_id: String) -> Self {
        Self {
            endpoint,
            subprotocol,
            channel_id,
            bytes_received: 0,
        }
    }

    /// Total payload bytes received over the connection so far.
    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    /// Connect and forward binary frames into the queue until the connection
    /// ends.
    ///
    /// Sends are non-blocking (the queue is unbounded), so a slow consumer
    /// shows up as memory growth rather than backpressure. Connection errors
    /// are returned to the caller; there is no reconnect.
    pub async fn run(&mut self, frames: &Sender<QueueItem>) -> Result<()> {
        let request = build_request(&self.endpoint, &self.subprotocol, &self.channel_id)?;
        debug!(
            endpoint = %self.endpoint,
            channel = %self.channel_id,
            "connecting to audio stream"
        );

        let (ws_stream, response) = connect_async(request).await?;
        debug!(status = %response.status(), "websocket handshake complete");

        let (mut write, mut read) = ws_stream.split();

        while let Some(message) = read.next().await {
            match message? {
                Message::Binary(data) => {
                    self.bytes_received += data.len() as u64;
                    trace!(frame_bytes = data.len(), "binary frame received");
                    if frames.send(QueueItem::Frame(data)).is_err() {
                        // Worker is gone; the session can't do anything useful.
                        warn!("transcription worker stopped accepting frames, ending session");
                        break;
                    }
                }
                Message::Ping(payload) => {
                    write.send(Message::Pong(payload)).await?;
                }
                Message::Close(frame) => {
                    debug!(?frame, "close frame received");
                    break;
                }
                Message::Text(text) => {
                    trace!(len = text.len(), "ignoring text message");
                }
                _ => {}
            }
        }

        debug!(bytes = self.bytes_received, "stream closed");
        Ok(())
    }
}
