use articlecrawler_core::types::{EnrichResult, ParseResult};
use tracing::{info, warn};

use crate::enrich;

/// Spawn a fixed pool of `workers` concurrent handlers. Hashing and language
/// detection are CPU-bound, so each item runs on the blocking thread pool.
pub fn spawn_pool(
    workers: usize,
    input: async_channel::Receiver<ParseResult>,
    output: async_channel::Sender<EnrichResult>,
    shutdown: tokio::sync::broadcast::Sender<()>,
) -> Vec<tokio::task::JoinHandle<()>> {
    (0..workers)
        .map(|worker_id| {
            let input = input.clone();
            let output = output.clone();
            let mut shutdown_rx = shutdown.subscribe();
            tokio::spawn(async move {
                info!(worker_id, "enricher worker started");
                loop {
                    let item = tokio::select! {
                        item = input.recv() => match item {
                            Ok(item) => item,
                            Err(_) => break,
                        },
                        _ = shutdown_rx.recv() => break,
                    };

                    let url = item.url.clone();
                    let result = match tokio::task::spawn_blocking(move || enrich(item)).await {
                        Ok(result) => result,
                        Err(_) => continue,
                    };
                    if output.try_send(result).is_err() {
                        warn!(url = %url, "enrich result queue full, dropping");
                    }
                }
                info!(worker_id, "enricher worker stopped");
            })
        })
        .collect()
}
