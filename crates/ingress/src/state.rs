use std::sync::Arc;

use articlecrawler_core::types::FetchJob;
use articlecrawler_hub::Hub;
use articlecrawler_store::Repository;

/// Shared state both the gRPC and HTTP ingress surfaces hold a clone of.
/// Ingress is only a URL producer and a subscriber drain: it never touches
/// the pipeline's internal queues beyond the fetch job entry point.
#[derive(Clone)]
pub struct IngressState {
    pub fetch_tx: async_channel::Sender<FetchJob>,
    pub hub: Hub,
    pub repo: Arc<dyn Repository>,
}
