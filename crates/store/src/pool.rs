use std::sync::Arc;
use std::time::Duration;

use articlecrawler_core::types::{EnrichResult, FetchAttempt};
use articlecrawler_hub::Hub;
use chrono::Utc;
use tracing::{error, info};

use crate::{NewArticle, Repository};

/// Pacing delay between items so a single store worker can't saturate the
/// database; aggregate throughput is `store_workers * 100/s` upper bound.
const PACING_DELAY: Duration = Duration::from_millis(10);

/// Spawn a fixed pool of `workers` concurrent store handlers. Each handler
/// persists or journals its item and, on a fresh write, publishes to the hub.
pub fn spawn_pool(
    repo: Arc<dyn Repository>,
    hub: Hub,
    workers: usize,
    input: async_channel::Receiver<EnrichResult>,
    shutdown: tokio::sync::broadcast::Sender<()>,
) -> Vec<tokio::task::JoinHandle<()>> {
    (0..workers)
        .map(|worker_id| {
            let repo = Arc::clone(&repo);
            let hub = hub.clone();
            let input = input.clone();
            let mut shutdown_rx = shutdown.subscribe();
            tokio::spawn(async move {
                info!(worker_id, "store worker started");
                loop {
                    let item = tokio::select! {
                        item = input.recv() => match item {
                            Ok(item) => item,
                            Err(_) => break,
                        },
                        _ = shutdown_rx.recv() => break,
                    };

                    handle_one(&*repo, &hub, item).await;
                    tokio::time::sleep(PACING_DELAY).await;
                }
                info!(worker_id, "store worker stopped");
            })
        })
        .collect()
}

async fn handle_one(repo: &dyn Repository, hub: &Hub, item: EnrichResult) {
    if let Some(error_text) = item.error {
        error!(url = %item.url, error = %error_text, "upstream failure, recording fetch attempt");
        repo.record_fetch_attempt(FetchAttempt {
            url: item.url.to_string(),
            success: false,
            response_code: 0,
            error_text,
            timestamp: Utc::now(),
        })
        .await;
        return;
    }

    let url = item.url.to_string();
    let draft = NewArticle {
        url: url.clone(),
        title: item.title,
        body: item.body,
        summary: item.summary,
        content_hash: item.content_hash,
        language: item.language,
        read_time_minutes: item.read_time_minutes,
    };

    match repo.save_article(draft).await {
        Ok(outcome) => {
            repo.record_fetch_attempt(FetchAttempt {
                url: url.clone(),
                success: true,
                response_code: 200,
                error_text: String::new(),
                timestamp: Utc::now(),
            })
            .await;
            if outcome.inserted {
                hub.publish(outcome.article);
            } else {
                info!(url = %url, "duplicate content, save skipped");
            }
        }
        Err(e) => {
            error!(url = %url, error = %e, "save failed, recording fetch attempt");
            repo.record_fetch_attempt(FetchAttempt {
                url,
                success: false,
                response_code: 0,
                error_text: e.to_string(),
                timestamp: Utc::now(),
            })
            .await;
        }
    }
}
