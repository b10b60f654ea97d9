/*
[INPUT]:  One FeedSource, user actions (sort, refresh, focus), feed events
[OUTPUT]: Dashboard state: view, statistics, connection status, toast
[POS]:    Controller layer - owns all mutable dashboard state and the feed task
[UPDATE]: When changing event handling, user actions, or feed lifecycle
*/

use std::time::Duration;

use anyhow::{Context, Result, bail};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{FeedMode, MonitorConfig};
use crate::feed::{
    ConnectionStatus, FeedCommand, FeedContext, FeedEvent, FeedSource, NoticeLevel, build_feed,
};
use crate::stats::BasisStats;
use crate::view::{FeedState, SortColumn};

const EVENT_CHANNEL_CAPACITY: usize = 64;
const COMMAND_CHANNEL_CAPACITY: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: NoticeLevel,
    pub message: String,
    pub expires_at: Instant,
}

/// Owns the dataset, sort state, statistics and the running feed.
///
/// The feed only talks to the controller through channels, so every mutation
/// happens here, in the order events were emitted.
pub struct DashboardController {
    state: FeedState,
    stats: Option<BasisStats>,
    status: ConnectionStatus,
    toast: Option<Toast>,
    toast_duration: Duration,
    mode: FeedMode,
    events: mpsc::Receiver<FeedEvent>,
    event_tx: Option<mpsc::Sender<FeedEvent>>,
    command_tx: mpsc::Sender<FeedCommand>,
    command_rx: Option<mpsc::Receiver<FeedCommand>>,
    shutdown: CancellationToken,
    worker: Option<JoinHandle<()>>,
    revision: u64,
}

impl DashboardController {
    /// Controller with no feed attached yet; see `start`
    pub fn new(display_limit: usize, toast_duration: Duration, shutdown: CancellationToken) -> Self {
        let (event_tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        Self {
            state: FeedState::new(display_limit),
            stats: None,
            status: ConnectionStatus::initial(0),
            toast: None,
            toast_duration,
            mode: FeedMode::default(),
            events,
            event_tx: Some(event_tx),
            command_tx,
            command_rx: Some(command_rx),
            shutdown,
            worker: None,
            revision: 0,
        }
    }

    /// Build the configured feed and start it. `shutdown` is the parent token.
    pub fn from_config(config: &MonitorConfig, shutdown: &CancellationToken) -> Result<Self> {
        let feed = build_feed(config).context("build feed")?;
        let mut controller = Self::new(
            config.display_limit,
            config.toast_duration(),
            shutdown.child_token(),
        );
        controller.start(feed)?;
        Ok(controller)
    }

    /// Spawn the feed task. Only one feed per controller.
    pub fn start(&mut self, mut feed: Box<dyn FeedSource>) -> Result<()> {
        if self.worker.is_some() {
            bail!("feed already running");
        }
        let (Some(events), Some(commands)) = (self.event_tx.take(), self.command_rx.take()) else {
            bail!("feed channels already consumed");
        };

        self.mode = feed.mode();
        self.status = ConnectionStatus::initial(feed.retry_limit());
        let ctx = FeedContext {
            events,
            commands,
            shutdown: self.shutdown.clone(),
        };
        info!(mode = self.mode.label(), "starting feed");
        self.worker = Some(tokio::spawn(async move { feed.run(ctx).await }));
        self.revision += 1;
        Ok(())
    }

    /// Wait for the next feed event; `None` once the feed has stopped
    pub async fn next_event(&mut self) -> Option<FeedEvent> {
        self.events.recv().await
    }

    /// Apply everything already queued without waiting
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    pub fn apply(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Status(status) => {
                debug!(
                    state = status.state.label(),
                    message = %status.message,
                    retry_count = status.retry_count,
                    "connection status"
                );
                self.status = status;
            }
            FeedEvent::Snapshot(snapshot) => {
                if self.state.replace(snapshot) {
                    self.stats = BasisStats::compute(self.state.records());
                } else {
                    info!("empty dataset received");
                }
            }
            FeedEvent::Rejected(reason) => {
                warn!(reason = %reason, "dataset rejected");
                self.state.show_placeholder();
            }
            FeedEvent::Notice(notice) => {
                self.show_toast(notice.level, notice.message);
            }
        }
        self.revision += 1;
    }

    pub fn sort_by(&mut self, column: SortColumn) {
        let sort = self.state.select_sort(column);
        let message = format!("Sorted by {} ({})", column.label(), sort.direction.label());
        self.show_toast(NoticeLevel::Info, message);
        self.revision += 1;
    }

    /// Manual refresh: immediate fetch, or a fresh retry budget after exhaustion
    pub fn refresh(&mut self) {
        self.send_command(FeedCommand::Refresh);
        self.show_toast(NoticeLevel::Info, "Refreshing data");
        self.revision += 1;
    }

    /// Terminal regained focus
    pub fn resume(&mut self) {
        self.send_command(FeedCommand::Resume);
    }

    fn send_command(&self, command: FeedCommand) {
        match self.command_tx.try_send(command) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => debug!(?command, "feed busy; command dropped"),
            Err(TrySendError::Closed(_)) => warn!(?command, "feed stopped; command dropped"),
        }
    }

    fn show_toast(&mut self, level: NoticeLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + self.toast_duration,
        });
    }

    /// Clear an expired toast; returns `true` if the display changed
    pub fn expire_toast(&mut self) -> bool {
        let expired = self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= Instant::now());
        if expired {
            self.toast = None;
            self.revision += 1;
        }
        expired
    }

    /// Stop the feed and wait for its task to finish
    pub async fn shutdown(&mut self) {
        self.shutdown.cancel();
        if let Some(worker) = self.worker.take() {
            if let Err(err) = worker.await {
                warn!(error = %err, "feed task ended abnormally");
            }
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn stats(&self) -> Option<&BasisStats> {
        self.stats.as_ref()
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    pub fn mode(&self) -> FeedMode {
        self.mode
    }

    /// Bumped on every visible change
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Drop for DashboardController {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
