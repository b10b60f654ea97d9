/*
[INPUT]:  Backend base URL for the push channel
[OUTPUT]: Real-time basis frames
[POS]:    WebSocket layer - real-time data streams
[UPDATE]: When adding new frame types or changing connection logic
*/

pub mod client;
pub mod message;

pub use client::{BasisWebSocket, WebSocketMessage, ws_url_from_base};
pub use message::BasisPayload;
