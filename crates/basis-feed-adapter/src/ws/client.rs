/*
[INPUT]:  WebSocket URL derived from the backend base URL
[OUTPUT]: Decoded basis frames via channel
[POS]:    WebSocket layer - push stream handling
[UPDATE]: When adding new frame types or changing connection logic
*/

use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};
use url::Url;

use crate::http::{FeedError, Result};
use crate::ws::message::BasisPayload;

const WS_PATH: &str = "/ws";
const CHANNEL_CAPACITY: usize = 100;
const MESSAGE_SAMPLE_LIMIT: usize = 3;
const OTHER_LOG_LIMIT: usize = 3;
const PARSE_FAIL_LOG_LIMIT: usize = 3;
const RAW_LOG_MAX_BYTES: usize = 1024;

static MESSAGE_SAMPLE_COUNT: AtomicUsize = AtomicUsize::new(0);
static OTHER_LOG_COUNT: AtomicUsize = AtomicUsize::new(0);
static PARSE_FAIL_LOG_COUNT: AtomicUsize = AtomicUsize::new(0);

/// Frames delivered by the push channel
#[derive(Debug, Clone, PartialEq)]
pub enum WebSocketMessage {
    /// First full table sent right after the socket opens
    InitialData(BasisPayload),
    /// Full table replacement pushed by the backend
    BasisUpdate(BasisPayload),
    /// Known frame type whose body could not be decoded
    Malformed { kind: String, reason: String },
    /// Unknown type or undecodable JSON
    Other,
}

impl WebSocketMessage {
    /// Decode a text frame. Never fails: anything unusable becomes `Other`.
    pub fn parse(text: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(err) => {
                log_parse_fail_once(&err, text);
                return WebSocketMessage::Other;
            }
        };

        let kind = value
            .get("type")
            .and_then(|kind| kind.as_str())
            .unwrap_or_default()
            .to_string();

        let parsed = match kind.as_str() {
            "initial_data" | "basis_update" => {
                match serde_json::from_value::<BasisPayload>(value) {
                    Ok(payload) if kind == "initial_data" => WebSocketMessage::InitialData(payload),
                    Ok(payload) => WebSocketMessage::BasisUpdate(payload),
                    Err(err) => {
                        warn!(kind = %kind, error = %err, "ws frame body rejected");
                        WebSocketMessage::Malformed {
                            kind,
                            reason: err.to_string(),
                        }
                    }
                }
            }
            _ => {
                log_other_message_once(&kind, text);
                return WebSocketMessage::Other;
            }
        };

        log_message_sample_once(&parsed);
        parsed
    }

    /// Frame type as sent on the wire
    pub fn kind(&self) -> &str {
        match self {
            WebSocketMessage::InitialData(_) => "initial_data",
            WebSocketMessage::BasisUpdate(_) => "basis_update",
            WebSocketMessage::Malformed { kind, .. } => kind,
            WebSocketMessage::Other => "other",
        }
    }
}

/// Derive the push endpoint from the HTTP base URL (`http -> ws`, `https -> wss`)
pub fn ws_url_from_base(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url)?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(FeedError::Config(format!(
                "unsupported base url scheme: {other}"
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| FeedError::Config(format!("cannot use {scheme} scheme for {base_url}")))?;
    url.set_path(WS_PATH);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// WebSocket client for the basis push channel
///
/// One instance drives one connection. The receiver yields decoded frames and
/// returns `None` once the socket closes; dropping the client closes the socket.
#[derive(Debug)]
pub struct BasisWebSocket {
    url: Url,
    message_tx: Option<mpsc::Sender<WebSocketMessage>>,
    message_rx: Option<mpsc::Receiver<WebSocketMessage>>,
    outbound_tx: Arc<Mutex<Option<mpsc::Sender<WsMessage>>>>,
}

impl BasisWebSocket {
    /// Create a new WebSocket client
    pub fn new(url: Url) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            url,
            message_tx: Some(tx),
            message_rx: Some(rx),
            outbound_tx: Arc::new(Mutex::new(None)),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Get the message receiver
    pub fn take_receiver(&mut self) -> Option<mpsc::Receiver<WebSocketMessage>> {
        self.message_rx.take()
    }

    /// Whether the pump task is still attached to the socket
    pub fn is_connected(&self) -> bool {
        self.outbound_tx
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Open the socket and start forwarding frames to the receiver
    pub async fn connect(&mut self) -> Result<()> {
        if self.message_tx.is_none() {
            return Err(FeedError::WebSocket(
                "websocket client already used".to_string(),
            ));
        }

        let (ws_stream, _response) = connect_async(self.url.as_str()).await?;
        let (mut write, mut read) = ws_stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<WsMessage>(CHANNEL_CAPACITY);

        let message_tx = self
            .message_tx
            .take()
            .ok_or_else(|| FeedError::WebSocket("websocket client already used".to_string()))?;

        if let Ok(mut guard) = self.outbound_tx.lock() {
            *guard = Some(outbound_tx);
        }
        let outbound_state = self.outbound_tx.clone();
        info!(url = %self.url, "ws connected");

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    outbound = outbound_rx.recv() => {
                        match outbound {
                            Some(message) => {
                                if write.send(message).await.is_err() {
                                    break;
                                }
                            }
                            None => {
                                let _ = write.send(WsMessage::Close(None)).await;
                                break;
                            }
                        }
                    }
                    incoming = read.next() => {
                        match incoming {
                            Some(Ok(WsMessage::Close(frame))) => {
                                debug!(?frame, "ws closed by peer");
                                let _ = write.send(WsMessage::Close(None)).await;
                                break;
                            }
                            Some(Ok(WsMessage::Ping(_))) | Some(Ok(WsMessage::Pong(_))) => {}
                            Some(Ok(message)) => {
                                if let Some(parsed) = Self::decode_frame(message) {
                                    if message_tx.send(parsed).await.is_err() {
                                        break;
                                    }
                                }
                            }
                            Some(Err(err)) => {
                                warn!(error = %err, "ws read failed");
                                break;
                            }
                            None => break,
                        }
                    }
                }
            }

            if let Ok(mut guard) = outbound_state.lock() {
                *guard = None;
            }
            // message_tx drops here, which ends the receiver stream
        });

        Ok(())
    }

    /// Ask the pump task to send a close frame and stop
    pub fn close(&self) {
        if let Ok(mut guard) = self.outbound_tx.lock() {
            guard.take();
        }
    }

    fn decode_frame(message: WsMessage) -> Option<WebSocketMessage> {
        let text = match message {
            WsMessage::Text(text) => text.to_string(),
            WsMessage::Binary(bytes) => String::from_utf8(bytes.to_vec()).ok()?,
            _ => return None,
        };
        Some(WebSocketMessage::parse(&text))
    }
}

impl Drop for BasisWebSocket {
    fn drop(&mut self) {
        self.close();
    }
}

fn log_message_sample_once(message: &WebSocketMessage) {
    let count = MESSAGE_SAMPLE_COUNT.fetch_add(1, Ordering::Relaxed);
    if count >= MESSAGE_SAMPLE_LIMIT {
        return;
    }

    match message {
        WebSocketMessage::InitialData(payload) | WebSocketMessage::BasisUpdate(payload) => {
            let records = payload
                .data
                .as_ref()
                .map(Vec::len)
                .unwrap_or_else(|| {
                    payload.top.as_ref().map(Vec::len).unwrap_or(0)
                        + payload.bottom.as_ref().map(Vec::len).unwrap_or(0)
                });
            info!(
                sample_index = count + 1,
                sample_limit = MESSAGE_SAMPLE_LIMIT,
                kind = message.kind(),
                records,
                "ws message sample"
            );
        }
        other => {
            info!(
                sample_index = count + 1,
                sample_limit = MESSAGE_SAMPLE_LIMIT,
                kind = other.kind(),
                "ws message sample"
            );
        }
    }
}

fn log_other_message_once(kind: &str, raw: &str) {
    let count = OTHER_LOG_COUNT.fetch_add(1, Ordering::Relaxed);
    if count < OTHER_LOG_LIMIT {
        info!(
            sample_index = count + 1,
            sample_limit = OTHER_LOG_LIMIT,
            kind,
            bytes = raw.len(),
            "ws message type unrecognized"
        );
        let preview = truncate_for_log(raw, RAW_LOG_MAX_BYTES);
        debug!(
            sample_index = count + 1,
            sample_limit = OTHER_LOG_LIMIT,
            message = %preview,
            "ws message type unrecognized"
        );
    }
}

fn log_parse_fail_once(err: &serde_json::Error, raw: &str) {
    let count = PARSE_FAIL_LOG_COUNT.fetch_add(1, Ordering::Relaxed);
    if count < PARSE_FAIL_LOG_LIMIT {
        info!(
            sample_index = count + 1,
            sample_limit = PARSE_FAIL_LOG_LIMIT,
            error = %err,
            bytes = raw.len(),
            "ws message parse failed"
        );
        let preview = truncate_for_log(raw, RAW_LOG_MAX_BYTES);
        debug!(
            sample_index = count + 1,
            sample_limit = PARSE_FAIL_LOG_LIMIT,
            message = %preview,
            "ws message parse failed"
        );
    }
}

fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut end = max_len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &value[..end])
}
