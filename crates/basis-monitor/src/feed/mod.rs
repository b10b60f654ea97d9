/*
[INPUT]:  Monitor configuration, controller commands
[OUTPUT]: Feed events (connection status, snapshots, notices) for the controller
[POS]:    Feed layer - data acquisition strategies behind one trait
[UPDATE]: When adding a feed strategy or changing the event protocol
*/

pub mod polling;
pub mod push;
pub mod retry;

use anyhow::{Context, Result};
use async_trait::async_trait;
use basis_feed_adapter::{BasisClient, BasisSnapshot, ws_url_from_base};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::{FeedMode, MonitorConfig};

pub use polling::{BasisFetcher, PollingFeed};
pub use push::{PushConnector, PushFeed, PushSession, WsConnector};
pub use retry::{Backoff, RetryBudget, RetryDecision};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
        }
    }
}

/// Connection state plus what the status line should say
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub message: String,
    pub retry_count: u32,
    pub max_retries: u32,
}

impl ConnectionStatus {
    pub fn new(
        state: ConnectionState,
        message: impl Into<String>,
        retry_count: u32,
        max_retries: u32,
    ) -> Self {
        Self {
            state,
            message: message.into(),
            retry_count,
            max_retries,
        }
    }

    pub fn initial(max_retries: u32) -> Self {
        Self::new(ConnectionState::Connecting, "Connecting...", 0, max_retries)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Transient user-facing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Feed -> controller
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Status(ConnectionStatus),
    /// A complete dataset; replaces whatever the controller holds
    Snapshot(BasisSnapshot),
    /// Backend reachable but payload unusable
    Rejected(String),
    Notice(Notice),
}

/// Controller -> feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCommand {
    /// Manual refresh
    Refresh,
    /// Terminal regained focus
    Resume,
}

/// Channels and shutdown signal handed to a running feed
#[derive(Debug)]
pub struct FeedContext {
    pub events: mpsc::Sender<FeedEvent>,
    pub commands: mpsc::Receiver<FeedCommand>,
    pub shutdown: CancellationToken,
}

impl FeedContext {
    /// Deliver an event; returns `false` once the controller is gone
    pub async fn emit(&self, event: FeedEvent) -> bool {
        self.events.send(event).await.is_ok()
    }

    pub async fn status(
        &self,
        state: ConnectionState,
        message: impl Into<String>,
        retry_count: u32,
        max_retries: u32,
    ) -> bool {
        self.emit(FeedEvent::Status(ConnectionStatus::new(
            state,
            message,
            retry_count,
            max_retries,
        )))
        .await
    }
}

/// A data acquisition strategy driven by one tokio task
#[async_trait]
pub trait FeedSource: Send + 'static {
    fn mode(&self) -> FeedMode;

    /// Retry ceiling shown next to the retry counter
    fn retry_limit(&self) -> u32;

    /// Run until `ctx.shutdown` fires or the controller drops its receiver
    async fn run(&mut self, ctx: FeedContext);
}

/// Build the feed selected by `config.mode`
pub fn build_feed(config: &MonitorConfig) -> Result<Box<dyn FeedSource>> {
    match config.mode {
        FeedMode::Poll => {
            let client = BasisClient::with_config_and_base_url(
                config.client_config(),
                &config.base_url,
            )
            .context("create basis http client")?;
            Ok(Box::new(PollingFeed::from_config(client, &config.poll)))
        }
        FeedMode::Push => {
            let url = ws_url_from_base(&config.base_url).context("derive websocket url")?;
            Ok(Box::new(PushFeed::from_config(
                WsConnector::new(url),
                &config.push,
            )))
        }
    }
}
