//! Feed doubles shared by the binary's unit tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use basis_monitor::feed::FeedContext;
use basis_monitor::{FeedCommand, FeedMode, FeedSource};

/// Feed that only records the commands it receives
#[derive(Clone, Default)]
pub(crate) struct RecordingFeed {
    seen: Arc<Mutex<Vec<FeedCommand>>>,
}

impl RecordingFeed {
    pub(crate) fn seen(&self) -> Vec<FeedCommand> {
        self.seen.lock().unwrap().clone()
    }

    /// Wait until `count` commands arrived
    pub(crate) async fn wait_for(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.seen.lock().unwrap().len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("commands not received in time");
    }
}

#[async_trait]
impl FeedSource for RecordingFeed {
    fn mode(&self) -> FeedMode {
        FeedMode::Poll
    }

    fn retry_limit(&self) -> u32 {
        0
    }

    async fn run(&mut self, mut ctx: FeedContext) {
        loop {
            tokio::select! {
                _ = ctx.shutdown.cancelled() => break,
                cmd = ctx.commands.recv() => match cmd {
                    Some(cmd) => {
                        self.seen.lock().unwrap().push(cmd);
                    }
                    None => break,
                },
            }
        }
    }
}
