/*
[INPUT]:  Basis fetcher (HTTP client), poll schedule, retry budget, controller commands
[OUTPUT]: Snapshot/status/notice events on a fixed poll schedule
[POS]:    Feed layer - HTTP polling strategy
[UPDATE]: When changing poll scheduling, retry handling, or command semantics
*/

use std::time::Duration;

use async_trait::async_trait;
use basis_feed_adapter::{BasisClient, BasisSnapshot, FeedError};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{FeedMode, PollConfig};
use crate::feed::retry::{Backoff, RetryBudget, RetryDecision};
use crate::feed::{ConnectionState, FeedCommand, FeedContext, FeedEvent, FeedSource, Notice};

/// Anything that can produce one complete basis snapshot
#[async_trait]
pub trait BasisFetcher: Send + Sync + 'static {
    async fn fetch(&self) -> Result<BasisSnapshot, FeedError>;
}

#[async_trait]
impl BasisFetcher for BasisClient {
    async fn fetch(&self) -> Result<BasisSnapshot, FeedError> {
        self.fetch_basis().await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Tick,
    Retry,
    Command(FeedCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollOutcome {
    Fetched,
    RetryIn(Duration),
    Exhausted,
    Closed,
}

/// Polls `GET /api/basis` every `interval`, retrying failures after `retry_delay`.
///
/// Once the retry budget is exhausted every timer is dropped; the feed then
/// sleeps until a `Refresh`/`Resume` command restarts the schedule.
pub struct PollingFeed<F> {
    fetcher: F,
    interval: Duration,
    budget: RetryBudget,
}

impl<F: BasisFetcher> PollingFeed<F> {
    pub fn new(fetcher: F, interval: Duration, retry_delay: Duration, max_retries: u32) -> Self {
        Self {
            fetcher,
            interval,
            budget: RetryBudget::new(max_retries, Backoff::Fixed(retry_delay)),
        }
    }

    pub fn from_config(fetcher: F, config: &PollConfig) -> Self {
        Self::new(
            fetcher,
            config.interval(),
            config.retry_delay(),
            config.max_retries,
        )
    }

    async fn poll_once(&mut self, ctx: &mut FeedContext) -> PollOutcome {
        let max = self.budget.max_attempts();
        let Some(result) = self.fetch_once(ctx).await else {
            return PollOutcome::Closed;
        };

        match result {
            Ok(snapshot) => {
                self.budget.reset();
                info!(
                    records = snapshot.records.len(),
                    timestamp = snapshot.timestamp.as_deref().unwrap_or("-"),
                    "basis snapshot fetched"
                );
                if !ctx.emit(FeedEvent::Snapshot(snapshot)).await {
                    return PollOutcome::Closed;
                }
                if !ctx.status(ConnectionState::Connected, "Connected", 0, max).await {
                    return PollOutcome::Closed;
                }
                PollOutcome::Fetched
            }
            Err(err) => {
                if err.is_payload_error() && !ctx.emit(FeedEvent::Rejected(err.to_string())).await {
                    return PollOutcome::Closed;
                }

                let decision = if err.is_retryable() {
                    self.budget.record_failure()
                } else {
                    warn!(error = %err, "basis fetch cannot succeed on retry");
                    self.budget.exhaust()
                };

                match decision {
                    RetryDecision::Retry { attempt, delay } => {
                        warn!(
                            error = %err,
                            retry_count = attempt,
                            max_retries = max,
                            ?delay,
                            "basis fetch failed; retrying"
                        );
                        let message = format!("Retrying... ({attempt}/{max})");
                        if !ctx
                            .status(ConnectionState::Connecting, message, attempt, max)
                            .await
                        {
                            return PollOutcome::Closed;
                        }
                        PollOutcome::RetryIn(delay)
                    }
                    RetryDecision::Exhausted { attempts } => {
                        warn!(
                            error = %err,
                            retry_count = attempts,
                            max_retries = max,
                            "basis fetch retries exhausted; polling stopped"
                        );
                        let delivered = ctx
                            .status(ConnectionState::Disconnected, "Connection failed", attempts, max)
                            .await
                            && ctx
                                .emit(FeedEvent::Notice(Notice::error(
                                    "Unable to load data. Press r to try again.",
                                )))
                                .await;
                        if !delivered {
                            return PollOutcome::Closed;
                        }
                        PollOutcome::Exhausted
                    }
                }
            }
        }
    }

    /// Await one fetch; commands arriving meanwhile are dropped. `None` on shutdown.
    async fn fetch_once(&self, ctx: &mut FeedContext) -> Option<Result<BasisSnapshot, FeedError>> {
        let fetch = self.fetcher.fetch();
        tokio::pin!(fetch);

        loop {
            tokio::select! {
                _ = ctx.shutdown.cancelled() => return None,
                result = &mut fetch => return Some(result),
                cmd = ctx.commands.recv() => match cmd {
                    Some(cmd) => debug!(?cmd, "fetch in flight; command ignored"),
                    None => return None,
                },
            }
        }
    }
}

#[async_trait]
impl<F: BasisFetcher> FeedSource for PollingFeed<F> {
    fn mode(&self) -> FeedMode {
        FeedMode::Poll
    }

    fn retry_limit(&self) -> u32 {
        self.budget.max_attempts()
    }

    async fn run(&mut self, mut ctx: FeedContext) {
        let max = self.budget.max_attempts();
        info!(interval = ?self.interval, max_retries = max, "polling feed started");
        if !ctx
            .status(ConnectionState::Connecting, "Loading data...", 0, max)
            .await
        {
            return;
        }

        let mut next_poll = Some(Instant::now());
        let mut retry_at: Option<Instant> = None;

        loop {
            let trigger = tokio::select! {
                _ = ctx.shutdown.cancelled() => break,
                _ = sleep_until_opt(next_poll) => Trigger::Tick,
                _ = sleep_until_opt(retry_at) => Trigger::Retry,
                cmd = ctx.commands.recv() => match cmd {
                    Some(cmd) => Trigger::Command(cmd),
                    None => break,
                },
            };

            if let Trigger::Command(cmd) = trigger {
                if self.budget.is_exhausted() {
                    info!(?cmd, "restarting poll schedule");
                    self.budget.reset();
                    if !ctx
                        .status(ConnectionState::Connecting, "Loading data...", 0, max)
                        .await
                    {
                        break;
                    }
                } else {
                    debug!(?cmd, "manual fetch requested");
                }
            } else {
                debug!(?trigger, "poll triggered");
            }

            retry_at = None;
            let outcome = self.poll_once(&mut ctx).await;

            match outcome {
                PollOutcome::Closed => break,
                PollOutcome::Exhausted => {
                    next_poll = None;
                    continue;
                }
                PollOutcome::RetryIn(delay) => retry_at = Some(Instant::now() + delay),
                PollOutcome::Fetched => {}
            }

            // ticks that passed during the fetch are dropped, as is the one that fired
            let now = Instant::now();
            let at = next_poll.get_or_insert(now);
            while *at <= now {
                *at += self.interval;
            }
        }

        info!("polling feed stopped");
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
