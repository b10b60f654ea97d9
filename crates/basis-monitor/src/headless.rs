/*
[INPUT]:  DashboardController events, shutdown token
[OUTPUT]: Dashboard summaries written through tracing
[POS]:    Headless runner - same controller as the TUI, log output only
[UPDATE]: When changing what headless runs report
*/

use anyhow::Result;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use basis_monitor::feed::{ConnectionState, NoticeLevel};
use basis_monitor::format::{format_percent, format_price, format_update_time, format_volume_usd};
use basis_monitor::{DashboardController, FeedEvent};

pub(crate) async fn run(controller: &mut DashboardController, shutdown: CancellationToken) -> Result<()> {
    let (resume_tx, resume_rx) = mpsc::channel(1);
    spawn_hangup_listener(resume_tx);
    run_with_resume(controller, shutdown, resume_rx).await
}

/// SIGHUP asks for a manual refresh, the headless stand-in for the `r` key
#[cfg(unix)]
fn spawn_hangup_listener(resume_tx: mpsc::Sender<()>) {
    use tokio::signal::unix::{SignalKind, signal};

    tokio::spawn(async move {
        let mut stream = match signal(SignalKind::hangup()) {
            Ok(stream) => stream,
            Err(err) => {
                warn!(error = %err, "failed to install SIGHUP handler");
                return;
            }
        };
        while stream.recv().await.is_some() {
            info!("received SIGHUP");
            if resume_tx.send(()).await.is_err() {
                break;
            }
        }
    });
}

#[cfg(not(unix))]
fn spawn_hangup_listener(_resume_tx: mpsc::Sender<()>) {}

async fn run_with_resume(
    controller: &mut DashboardController,
    shutdown: CancellationToken,
    mut resume: mpsc::Receiver<()>,
) -> Result<()> {
    info!(mode = controller.mode().label(), "running headless");
    let mut resume_open = true;

    loop {
        let event = tokio::select! {
            _ = shutdown.cancelled() => break,
            request = resume.recv(), if resume_open => {
                match request {
                    Some(()) => controller.refresh(),
                    None => resume_open = false,
                }
                continue;
            }
            event = controller.next_event() => event,
        };
        let Some(event) = event else {
            warn!("feed stopped");
            break;
        };

        match &event {
            FeedEvent::Status(status) => match status.state {
                ConnectionState::Disconnected => warn!(
                    state = status.state.label(),
                    retries = status.retry_count,
                    max_retries = status.max_retries,
                    "{}",
                    status.message
                ),
                _ => info!(
                    state = status.state.label(),
                    retries = status.retry_count,
                    max_retries = status.max_retries,
                    "{}",
                    status.message
                ),
            },
            FeedEvent::Notice(notice) => match notice.level {
                NoticeLevel::Error => error!("{}", notice.message),
                _ => info!("{}", notice.message),
            },
            FeedEvent::Rejected(reason) => warn!(%reason, "payload rejected"),
            FeedEvent::Snapshot(_) => {}
        }

        let is_data = matches!(event, FeedEvent::Snapshot(_));
        controller.apply(event);
        if is_data {
            log_summary(controller);
        }
    }

    Ok(())
}

fn log_summary(controller: &DashboardController) {
    let state = controller.state();
    if state.is_placeholder() {
        info!("snapshot carried no records");
        return;
    }

    let last_update = state
        .last_update()
        .map(format_update_time)
        .unwrap_or_else(|| "-".to_string());
    if let Some(stats) = controller.stats() {
        info!(
            pairs = stats.record_count,
            max_symbol = %stats.max_symbol,
            max_basis = %format_percent(stats.max_basis_percent),
            avg_basis = %format_percent(stats.average_basis_percent),
            total_volume = %format_volume_usd(stats.total_notional),
            %last_update,
            "basis snapshot"
        );
    }

    let sort = state.sort();
    for (rank, record) in state.visible().iter().enumerate() {
        info!(
            rank = rank + 1,
            symbol = %record.symbol,
            spot = %format_price(record.spot_price),
            futures = %format_price(record.futures_price),
            basis = %format_price(record.basis),
            basis_percent = %format_percent(record.basis_percent),
            sort = sort.column.label(),
            "row"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::RecordingFeed;
    use basis_monitor::FeedCommand;

    #[tokio::test]
    async fn test_resume_request_refreshes_feed() {
        let shutdown = CancellationToken::new();
        let mut controller =
            DashboardController::new(10, Duration::from_secs(3), shutdown.child_token());
        let feed = RecordingFeed::default();
        controller.start(Box::new(feed.clone())).unwrap();

        let (resume_tx, resume_rx) = mpsc::channel(1);
        resume_tx.send(()).await.unwrap();

        let waiter = feed.clone();
        let stop = shutdown.clone();
        tokio::spawn(async move {
            waiter.wait_for(1).await;
            stop.cancel();
        });

        run_with_resume(&mut controller, shutdown, resume_rx)
            .await
            .unwrap();
        controller.shutdown().await;

        assert_eq!(feed.seen(), vec![FeedCommand::Refresh]);
    }
}
