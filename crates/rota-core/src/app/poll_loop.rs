//! Auto-tick poll loop.
//!
//! The engine never schedules itself; a host that wants continuous
//! correlation spawns this loop. Activity logs change slowly, so polling
//! (default every 60s) is plenty, and the materialize write path is an
//! idempotent upsert, so overlapping or repeated passes are harmless.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::runtime::Runtime;
use crate::domain::VenueId;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Poll loop handle.
/// - `request_shutdown()` で次の判定時に停止する
/// - `shutdown_and_join()` で終了まで待てる
pub struct AutoTickLoop {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl AutoTickLoop {
    /// Spawn the loop over a fixed venue set. The first pass runs
    /// immediately, then every `every`.
    pub fn spawn(runtime: Arc<Runtime>, venues: Vec<VenueId>, every: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let join = tokio::spawn(async move {
            poll_loop(runtime, venues, every, &mut shutdown_rx).await;
        });

        Self { shutdown_tx, join }
    }

    /// Request shutdown. In-flight store writes finish; no new pass starts.
    pub fn request_shutdown(&self) {
        // ignore send error: receiver may already be dropped
        let _ = self.shutdown_tx.send(true);
    }

    /// Shutdown and wait for the loop to exit.
    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}

async fn poll_loop(
    runtime: Arc<Runtime>,
    venues: Vec<VenueId>,
    every: Duration,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(every);
    loop {
        // shutdown が来ていたら抜ける
        if *shutdown_rx.borrow() {
            break;
        }

        // tick は「待つ」ので select で shutdown と競合させる
        tokio::select! {
            _ = shutdown_rx.changed() => {
                // 変更が入ったら次のループで判定
                continue;
            }
            _ = ticker.tick() => {}
        }

        let day = runtime.today();
        for venue in &venues {
            match runtime.materialize_auto_ticks(venue, day).await {
                Ok(created) if !created.is_empty() => {
                    info!(
                        venue = %venue,
                        day = %day,
                        created = created.len(),
                        "auto-tick poll materialized completions"
                    );
                }
                Ok(_) => {}
                Err(error) => {
                    // One venue failing must not stop the pass or the loop.
                    warn!(
                        venue = %venue,
                        day = %day,
                        %error,
                        "auto-tick poll failed; will retry next tick"
                    );
                }
            }
        }
    }
}
