use std::sync::Arc;

use articlecrawler_core::config::AppConfig;
use articlecrawler_core::types::FetchJob;
use articlecrawler_fetcher::{Fetcher, FetcherConfig};
use articlecrawler_hub::Hub;
use articlecrawler_limiter::DomainLimiter;
use articlecrawler_store::{PgRepository, Repository};
use tracing::info;

/// Bounded capacity shared by each of the four inter-stage queues.
const QUEUE_CAPACITY: usize = 100;

/// The running fetch -> parse -> enrich -> store pipeline plus its
/// cross-cutting services (Hub, Repository). Owns every worker task and the
/// single shutdown signal that propagates cancellation to all of them.
pub struct Pipeline {
    pub fetch_tx: async_channel::Sender<FetchJob>,
    pub hub: Hub,
    pub repo: Arc<dyn Repository>,
    pub shutdown_tx: tokio::sync::broadcast::Sender<()>,
    workers: Vec<tokio::task::JoinHandle<()>>,
}

impl Pipeline {
    pub async fn start(config: &AppConfig) -> anyhow::Result<Self> {
        let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);

        let pool_size = (config.pipeline.store_workers as u32 + 5).max(10);
        let repo = PgRepository::new(&config.database.url, pool_size).await?;
        repo.run_migrations().await?;
        let repo: Arc<dyn Repository> = Arc::new(repo);

        let (hub, hub_join) = Hub::spawn(shutdown_tx.clone());

        let (jobs_tx, jobs_rx) = async_channel::bounded(QUEUE_CAPACITY);
        let (fetched_tx, fetched_rx) = async_channel::bounded(QUEUE_CAPACITY);
        let (parsed_tx, parsed_rx) = async_channel::bounded(QUEUE_CAPACITY);
        let (enriched_tx, enriched_rx) = async_channel::bounded(QUEUE_CAPACITY);

        let limiter = Arc::new(DomainLimiter::new(
            config.rate_limit.default_rps,
            config.rate_limit.burst,
        ));
        let fetcher = Arc::new(Fetcher::new(
            limiter,
            FetcherConfig {
                base_backoff: config.backoff.base(),
                max_retries: config.backoff.max_retries,
            },
        )?);

        let mut workers = vec![hub_join];
        workers.extend(articlecrawler_fetcher::spawn_pool(
            fetcher,
            config.pipeline.fetch_workers,
            jobs_rx,
            fetched_tx,
            shutdown_tx.clone(),
        ));
        workers.extend(articlecrawler_parser::spawn_pool(
            config.pipeline.parse_workers,
            fetched_rx,
            parsed_tx,
            shutdown_tx.clone(),
        ));
        workers.extend(articlecrawler_enricher::spawn_pool(
            config.pipeline.enrich_workers,
            parsed_rx,
            enriched_tx,
            shutdown_tx.clone(),
        ));
        workers.extend(articlecrawler_store::spawn_pool(
            Arc::clone(&repo),
            hub.clone(),
            config.pipeline.store_workers,
            enriched_rx,
            shutdown_tx.clone(),
        ));

        info!(
            fetch_workers = config.pipeline.fetch_workers,
            parse_workers = config.pipeline.parse_workers,
            enrich_workers = config.pipeline.enrich_workers,
            store_workers = config.pipeline.store_workers,
            "pipeline started"
        );

        Ok(Self {
            fetch_tx: jobs_tx,
            hub,
            repo,
            shutdown_tx,
            workers,
        })
    }

    /// Broadcast the cancellation signal, wait out the shutdown grace period,
    /// then abort anything still running. Queued but unprocessed work is
    /// discarded, per spec.
    pub async fn shutdown(self, grace_period: std::time::Duration) {
        let _ = self.shutdown_tx.send(());
        tokio::time::sleep(grace_period).await;
        for worker in self.workers {
            worker.abort();
        }
    }
}
