use std::sync::Arc;

use articlecrawler_core::types::{FetchJob, FetchResult};
use tracing::{info, warn};

use crate::fetcher::Fetcher;

/// Spawn a fixed pool of `workers` concurrent handlers pulling jobs from a
/// shared multi-consumer queue. Pool size is the true concurrency cap: no
/// per-item fan-out beyond it (see DESIGN.md).
pub fn spawn_pool(
    fetcher: Arc<Fetcher>,
    workers: usize,
    input: async_channel::Receiver<FetchJob>,
    output: async_channel::Sender<FetchResult>,
    shutdown: tokio::sync::broadcast::Sender<()>,
) -> Vec<tokio::task::JoinHandle<()>> {
    (0..workers)
        .map(|worker_id| {
            let fetcher = Arc::clone(&fetcher);
            let input = input.clone();
            let output = output.clone();
            let mut shutdown_rx = shutdown.subscribe();
            tokio::spawn(async move {
                info!(worker_id, "fetcher worker started");
                loop {
                    let job = tokio::select! {
                        job = input.recv() => match job {
                            Ok(job) => job,
                            Err(_) => break,
                        },
                        _ = shutdown_rx.recv() => break,
                    };

                    let url = job.url.clone();
                    match fetcher.fetch(job, &mut shutdown_rx).await {
                        Some(result) => {
                            if output.try_send(result).is_err() {
                                warn!(url = %url, "fetch result queue full, dropping");
                            }
                        }
                        None => break, // cancelled mid-flight
                    }
                }
                info!(worker_id, "fetcher worker stopped");
            })
        })
        .collect()
}
