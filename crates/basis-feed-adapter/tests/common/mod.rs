/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared fixtures, mock HTTP server and a scripted WebSocket server
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for basis-feed-adapter tests

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// One record in wire format
pub fn record_json(symbol: &str, basis_percent: f64) -> Value {
    json!({
        "symbol": symbol,
        "spot_price": 100.0,
        "futures_price": 100.0 + basis_percent,
        "basis": basis_percent,
        "basis_percent": basis_percent,
        "spot_volume": 1000.0,
        "futures_volume": 2000.0,
        "last_update": "2024-05-01T09:30:00"
    })
}

/// Successful `/api/basis` body
pub fn basis_body(records: Vec<Value>) -> Value {
    let total = records.len();
    json!({
        "success": true,
        "timestamp": "2024-05-01T09:30:00.000000",
        "total_count": total,
        "data": records
    })
}

/// Accept a single WebSocket client, send `frames` in order, then close.
///
/// Returns the `http://` base URL of the listener and the server task.
pub async fn scripted_ws_server(frames: Vec<String>) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(stream)
            .await
            .expect("handshake");
        for frame in frames {
            ws.send(Message::Text(frame.into())).await.expect("send frame");
        }
        ws.close(None).await.ok();
        // drain until the client acknowledges the close
        while let Some(Ok(_)) = ws.next().await {}
    });

    (format!("http://{addr}"), handle)
}
