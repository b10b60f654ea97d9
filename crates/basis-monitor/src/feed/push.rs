/*
[INPUT]:  WebSocket connector, reconnect policy, controller commands
[OUTPUT]: Snapshot/status/notice events from the push channel
[POS]:    Feed layer - WebSocket push strategy with linear reconnect backoff
[UPDATE]: When changing reconnect policy or frame handling
*/

use std::time::Duration;

use async_trait::async_trait;
use basis_feed_adapter::{BasisWebSocket, FeedError, WebSocketMessage};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{FeedMode, PushConfig};
use crate::feed::retry::{Backoff, RetryBudget, RetryDecision};
use crate::feed::{ConnectionState, FeedContext, FeedEvent, FeedSource, Notice};

/// An open push connection
///
/// The receiver ends when the socket closes.
pub struct PushSession {
    pub messages: mpsc::Receiver<WebSocketMessage>,
    // dropping the socket closes the connection
    _socket: Option<BasisWebSocket>,
}

impl PushSession {
    pub fn new(messages: mpsc::Receiver<WebSocketMessage>) -> Self {
        Self {
            messages,
            _socket: None,
        }
    }

    pub fn with_socket(socket: BasisWebSocket, messages: mpsc::Receiver<WebSocketMessage>) -> Self {
        Self {
            messages,
            _socket: Some(socket),
        }
    }
}

/// Opens push sessions
#[async_trait]
pub trait PushConnector: Send + Sync + 'static {
    async fn connect(&self) -> Result<PushSession, FeedError>;

    /// Endpoint description for logs
    fn endpoint(&self) -> String;
}

/// Connects to the backend `/ws` endpoint
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: Url,
}

impl WsConnector {
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}

#[async_trait]
impl PushConnector for WsConnector {
    async fn connect(&self) -> Result<PushSession, FeedError> {
        let mut socket = BasisWebSocket::new(self.url.clone());
        let messages = socket
            .take_receiver()
            .ok_or_else(|| FeedError::WebSocket("receiver already taken".to_string()))?;
        socket.connect().await?;
        Ok(PushSession::with_socket(socket, messages))
    }

    fn endpoint(&self) -> String {
        self.url.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamExit {
    Disconnected,
    Shutdown,
}

/// Keeps a push session open, reconnecting after `attempt * base_delay`.
pub struct PushFeed<C> {
    connector: C,
    budget: RetryBudget,
}

impl<C: PushConnector> PushFeed<C> {
    pub fn new(connector: C, base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            connector,
            budget: RetryBudget::new(max_attempts, Backoff::Linear(base_delay)),
        }
    }

    pub fn from_config(connector: C, config: &PushConfig) -> Self {
        Self::new(
            connector,
            config.reconnect_delay(),
            config.max_reconnect_attempts,
        )
    }

    async fn stream_loop(&self, ctx: &mut FeedContext, mut session: PushSession) -> StreamExit {
        loop {
            tokio::select! {
                _ = ctx.shutdown.cancelled() => return StreamExit::Shutdown,
                cmd = ctx.commands.recv() => match cmd {
                    Some(cmd) => debug!(?cmd, "push feed connected; command ignored"),
                    None => return StreamExit::Shutdown,
                },
                msg = session.messages.recv() => match msg {
                    Some(message) => {
                        if !self.handle_message(ctx, message).await {
                            return StreamExit::Shutdown;
                        }
                    }
                    None => {
                        warn!("basis push stream ended");
                        return StreamExit::Disconnected;
                    }
                },
            }
        }
    }

    async fn handle_message(&self, ctx: &FeedContext, message: WebSocketMessage) -> bool {
        match message {
            WebSocketMessage::InitialData(payload) | WebSocketMessage::BasisUpdate(payload) => {
                match payload.into_snapshot() {
                    Some(snapshot) => {
                        debug!(records = snapshot.records.len(), "basis frame applied");
                        ctx.emit(FeedEvent::Snapshot(snapshot)).await
                    }
                    None => {
                        warn!("basis frame carried no records");
                        ctx.emit(FeedEvent::Rejected("frame carried no records".to_string()))
                            .await
                    }
                }
            }
            WebSocketMessage::Malformed { kind, reason } => {
                ctx.emit(FeedEvent::Rejected(format!("{kind}: {reason}")))
                    .await
            }
            WebSocketMessage::Other => {
                debug!("push frame ignored");
                true
            }
        }
    }

    /// Wait out a reconnect delay; a command cuts it short. `false` on shutdown.
    async fn wait_backoff(&self, ctx: &mut FeedContext, delay: Duration) -> bool {
        tokio::select! {
            _ = ctx.shutdown.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
            cmd = ctx.commands.recv() => match cmd {
                Some(cmd) => {
                    info!(?cmd, "reconnecting early");
                    true
                }
                None => false,
            },
        }
    }

    /// Park until the user asks for a reconnect. `false` on shutdown.
    async fn wait_command(&self, ctx: &mut FeedContext) -> bool {
        tokio::select! {
            _ = ctx.shutdown.cancelled() => false,
            cmd = ctx.commands.recv() => match cmd {
                Some(cmd) => {
                    info!(?cmd, "reconnect requested");
                    true
                }
                None => false,
            },
        }
    }
}

#[async_trait]
impl<C: PushConnector> FeedSource for PushFeed<C> {
    fn mode(&self) -> FeedMode {
        FeedMode::Push
    }

    fn retry_limit(&self) -> u32 {
        self.budget.max_attempts()
    }

    async fn run(&mut self, mut ctx: FeedContext) {
        let max = self.budget.max_attempts();
        let endpoint = self.connector.endpoint();
        info!(endpoint = %endpoint, max_reconnect_attempts = max, "push feed started");

        'run: loop {
            let attempts = self.budget.attempts();
            if !ctx
                .status(ConnectionState::Connecting, "Connecting...", attempts, max)
                .await
            {
                break 'run;
            }

            let connected = tokio::select! {
                _ = ctx.shutdown.cancelled() => break 'run,
                result = self.connector.connect() => result,
            };

            match connected {
                Ok(session) => {
                    self.budget.reset();
                    info!(endpoint = %endpoint, "push feed connected");
                    let delivered = ctx
                        .status(ConnectionState::Connected, "Connected", 0, max)
                        .await
                        && ctx
                            .emit(FeedEvent::Notice(Notice::success(
                                "Live connection established",
                            )))
                            .await;
                    if !delivered {
                        break 'run;
                    }

                    match self.stream_loop(&mut ctx, session).await {
                        StreamExit::Shutdown => break 'run,
                        StreamExit::Disconnected => {
                            if !ctx
                                .status(ConnectionState::Disconnected, "Connection lost", 0, max)
                                .await
                            {
                                break 'run;
                            }
                        }
                    }
                }
                Err(err) => {
                    warn!(endpoint = %endpoint, error = %err, "push connect failed");
                    if !ctx
                        .status(
                            ConnectionState::Disconnected,
                            "Connection error",
                            attempts,
                            max,
                        )
                        .await
                    {
                        break 'run;
                    }
                }
            }

            match self.budget.record_failure() {
                RetryDecision::Retry { attempt, delay } => {
                    info!(retry_count = attempt, max_retries = max, ?delay, "scheduling reconnect");
                    let message =
                        format!("Reconnecting in {}s... ({attempt}/{max})", delay.as_secs());
                    if !ctx
                        .status(ConnectionState::Connecting, message, attempt, max)
                        .await
                    {
                        break 'run;
                    }
                    if !self.wait_backoff(&mut ctx, delay).await {
                        break 'run;
                    }
                }
                RetryDecision::Exhausted { attempts } => {
                    warn!(retry_count = attempts, max_retries = max, "push reconnects exhausted");
                    let delivered = ctx
                        .status(ConnectionState::Disconnected, "Connection failed", attempts, max)
                        .await
                        && ctx
                            .emit(FeedEvent::Notice(Notice::error(
                                "Live connection failed. Press r to reconnect.",
                            )))
                            .await;
                    if !delivered || !self.wait_command(&mut ctx).await {
                        break 'run;
                    }
                    self.budget.reset();
                }
            }
        }

        info!("push feed stopped");
    }
}
