use articlecrawler_core::types::{FetchResult, ParseResult};
use tracing::{info, warn};

use crate::parse;

/// Spawn a fixed pool of `workers` concurrent handlers. Parsing is CPU-bound,
/// so each item is handed to the blocking thread pool to avoid stalling the
/// async executor.
pub fn spawn_pool(
    workers: usize,
    input: async_channel::Receiver<FetchResult>,
    output: async_channel::Sender<ParseResult>,
    shutdown: tokio::sync::broadcast::Sender<()>,
) -> Vec<tokio::task::JoinHandle<()>> {
    (0..workers)
        .map(|worker_id| {
            let input = input.clone();
            let output = output.clone();
            let mut shutdown_rx = shutdown.subscribe();
            tokio::spawn(async move {
                info!(worker_id, "parser worker started");
                loop {
                    let item = tokio::select! {
                        item = input.recv() => match item {
                            Ok(item) => item,
                            Err(_) => break,
                        },
                        _ = shutdown_rx.recv() => break,
                    };

                    let url = item.url.clone();
                    let result = match tokio::task::spawn_blocking(move || parse(item)).await {
                        Ok(result) => result,
                        Err(_) => continue, // task panicked or was cancelled; drop silently
                    };
                    if output.try_send(result).is_err() {
                        warn!(url = %url, "parse result queue full, dropping");
                    }
                }
                info!(worker_id, "parser worker stopped");
            })
        })
        .collect()
}
