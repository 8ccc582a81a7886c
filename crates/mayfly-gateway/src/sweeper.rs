use std::sync::Arc;
use std::time::Duration;

use mayfly_pastebin::Pastebin;
use mayfly_shortener::UrlShortener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

/// Rows removed by one sweep. A failed half counts as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub short_urls: u64,
    pub pastes: u64,
}

/// Periodically deletes expired short URLs and pastes.
#[derive(Clone)]
pub struct Sweeper {
    shortener: Arc<dyn UrlShortener>,
    pastebin: Arc<dyn Pastebin>,
    interval: Duration,
}

impl Sweeper {
    pub fn new(
        shortener: Arc<dyn UrlShortener>,
        pastebin: Arc<dyn Pastebin>,
        interval: Duration,
    ) -> Self {
        Self {
            shortener,
            pastebin,
            interval,
        }
    }

    pub async fn sweep_once(&self) -> SweepReport {
        let mut report = SweepReport::default();

        match self.shortener.delete_expired().await {
            Ok(removed) => report.short_urls = removed,
            Err(error) => error!(%error, "failed to sweep expired short urls"),
        }
        match self.pastebin.delete_expired().await {
            Ok(removed) => report.pastes = removed,
            Err(error) => error!(%error, "failed to sweep expired pastes"),
        }

        report
    }

    /// Starts sweeping on a background task. The first sweep runs immediately.
    pub fn spawn(self) -> SweeperHandle {
        let (stop_tx, mut stop_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval = ?self.interval, "expiration sweeper started");

            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let report = self.sweep_once().await;
                        if report != SweepReport::default() {
                            info!(short_urls = report.short_urls, pastes = report.pastes, "sweep finished");
                        }
                    }
                }
            }

            info!("expiration sweeper stopped");
        });

        SweeperHandle {
            stop: stop_tx,
            task,
        }
    }
}

pub struct SweeperHandle {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stops the sweeper and waits for an in-flight sweep to finish.
    pub async fn shutdown(self) {
        let _ = self.stop.send(());
        if let Err(error) = self.task.await {
            error!(%error, "expiration sweeper panicked");
        }
    }
}
