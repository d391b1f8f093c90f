//! WebSocket push channel for real-time status events.
//!
//! One [`PushChannel`] is one connection: connect, announce readiness,
//! then read `new_event` frames until the server closes or the stream
//! drops. Reconnection, retry counting, and the polling fallback all live
//! in `doorwarden-core` -- this module only speaks the wire protocol.
//!
//! Every message is a JSON text frame `{"event": "<name>", "data": {...}}`.
//! Inbound `new_event` data matches [`StatusSnapshot`]; frames with any
//! other event name are skipped.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace};
use url::Url;

use crate::error::Error;
use crate::snapshot::StatusSnapshot;

/// Inbound event carrying a status snapshot.
pub const EVENT_NEW_EVENT: &str = "new_event";

/// Outbound ready signal, sent once per successful connect.
pub const EVENT_CLIENT_READY: &str = "client_ready";

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Frame envelope shared by both directions.
#[derive(Debug, Deserialize)]
struct Frame {
    event: String,
    #[serde(default)]
    data: Value,
}

/// A live push connection to the backend's `events` channel.
pub struct PushChannel {
    write: SplitSink<WsStream, tungstenite::Message>,
    read: SplitStream<WsStream>,
}

impl PushChannel {
    /// Open a WebSocket connection to the events endpoint.
    pub async fn connect(url: &Url) -> Result<Self, Error> {
        info!(url = %url, "connecting push channel");

        let uri: tungstenite::http::Uri = url
            .as_str()
            .parse()
            .map_err(|e: tungstenite::http::uri::InvalidUri| {
                Error::WebSocketConnect(e.to_string())
            })?;
        let request = ClientRequestBuilder::new(uri);

        let (ws_stream, _response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

        info!("push channel connected");

        let (write, read) = ws_stream.split();
        Ok(Self { write, read })
    }

    /// Send the `client_ready` signal with the page name and current time.
    pub async fn announce_ready(&mut self, page: &str) -> Result<(), Error> {
        let frame = serde_json::json!({
            "event": EVENT_CLIENT_READY,
            "data": {
                "page": page,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            },
        });

        self.write
            .send(tungstenite::Message::text(frame.to_string()))
            .await
            .map_err(|e| Error::WebSocket(e.to_string()))
    }

    /// Read frames until the next status snapshot.
    ///
    /// Returns `Ok(None)` when the server sends a close frame or the stream
    /// ends -- the caller decides whether that means reconnect or fall back.
    pub async fn next_snapshot(&mut self) -> Result<Option<StatusSnapshot>, Error> {
        loop {
            match self.read.next().await {
                Some(Ok(tungstenite::Message::Text(text))) => {
                    if let Some(snapshot) = parse_event_frame(&text) {
                        return Ok(Some(snapshot));
                    }
                }
                Some(Ok(tungstenite::Message::Ping(_))) => {
                    // tungstenite handles pong replies automatically
                    trace!("push channel ping");
                }
                Some(Ok(tungstenite::Message::Close(frame))) => {
                    if let Some(ref cf) = frame {
                        info!(code = %cf.code, reason = %cf.reason, "push channel close frame");
                    } else {
                        info!("push channel close frame (no payload)");
                    }
                    return Ok(None);
                }
                Some(Err(e)) => {
                    return Err(Error::WebSocket(e.to_string()));
                }
                None => {
                    // Stream ended without a close frame
                    info!("push channel stream ended");
                    return Ok(None);
                }
                _ => {
                    // Binary, Pong, Frame -- ignore
                }
            }
        }
    }
}

/// Parse one text frame into a snapshot, or `None` when the frame is not a
/// well-formed `new_event` message. Malformed frames are logged and skipped
/// rather than tearing down the connection.
fn parse_event_frame(text: &str) -> Option<StatusSnapshot> {
    let frame: Frame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            debug!(error = %e, "failed to parse push frame envelope");
            return None;
        }
    };

    if frame.event != EVENT_NEW_EVENT {
        trace!(event = %frame.event, "skipping non-status event");
        return None;
    }

    Some(StatusSnapshot::from_event_value(&frame.data))
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_new_event_frame() {
        let raw = json!({
            "event": "new_event",
            "data": {
                "door_status": "Open",
                "statistics": { "total_events": 10 }
            }
        });

        let snapshot = parse_event_frame(&raw.to_string()).expect("frame parsed");
        assert_eq!(snapshot.door_status.as_deref(), Some("Open"));
        assert_eq!(
            snapshot.statistics.and_then(|s| s.total_events),
            Some(10)
        );
    }

    #[test]
    fn skip_unknown_event_names() {
        let raw = json!({
            "event": "anomaly_detected",
            "data": { "door_status": "Open" }
        });

        assert!(parse_event_frame(&raw.to_string()).is_none());
    }

    #[test]
    fn skip_malformed_frames() {
        assert!(parse_event_frame("not json at all").is_none());
        assert!(parse_event_frame("{\"data\": {}}").is_none());
    }

    #[test]
    fn new_event_with_partially_malformed_data() {
        let raw = json!({
            "event": "new_event",
            "data": {
                "door_status": 17,
                "alarm_status": "Active"
            }
        });

        let snapshot = parse_event_frame(&raw.to_string()).expect("frame parsed");
        assert!(snapshot.door_status.is_none());
        assert_eq!(snapshot.alarm_status.as_deref(), Some("Active"));
    }
}
