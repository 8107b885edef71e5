//! Single-owner broadcast hub: fans out newly stored articles to live
//! subscribers without ever blocking the publisher on a slow reader.

use std::collections::HashMap;

use articlecrawler_core::types::Article;
use tracing::{info, warn};

const SUBSCRIBER_BUFFER: usize = 10;
const INBOX_BUFFER: usize = 100;

/// A handle subscribers and the Store stage use to talk to the hub actor.
/// Cloning is cheap; every clone reaches the same single-owner event loop.
#[derive(Clone)]
pub struct Hub {
    add_tx: async_channel::Sender<(String, async_channel::Sender<Article>)>,
    remove_tx: async_channel::Sender<String>,
    publish_tx: async_channel::Sender<Article>,
}

impl Hub {
    /// Spawn the actor task that owns the subscription map. Returns the
    /// handle and its join handle for shutdown bookkeeping.
    pub fn spawn(shutdown: tokio::sync::broadcast::Sender<()>) -> (Self, tokio::task::JoinHandle<()>) {
        let (add_tx, add_rx) = async_channel::bounded(INBOX_BUFFER);
        let (remove_tx, remove_rx) = async_channel::bounded(INBOX_BUFFER);
        let (publish_tx, publish_rx) = async_channel::bounded(INBOX_BUFFER);

        let shutdown_rx = shutdown.subscribe();
        let join = tokio::spawn(run_actor(add_rx, remove_rx, publish_rx, shutdown_rx));

        (
            Self {
                add_tx,
                remove_tx,
                publish_tx,
            },
            join,
        )
    }

    /// Register a new subscription and return its read side. Overwrites any
    /// previous binding under the same id.
    pub fn subscribe(&self, id: impl Into<String>) -> async_channel::Receiver<Article> {
        let (tx, rx) = async_channel::bounded(SUBSCRIBER_BUFFER);
        let id = id.into();
        if self.add_tx.try_send((id.clone(), tx)).is_err() {
            warn!(id = %id, "hub inbox full, subscribe dropped");
        }
        rx
    }

    pub fn unsubscribe(&self, id: impl Into<String>) {
        let id = id.into();
        if self.remove_tx.try_send(id.clone()).is_err() {
            warn!(id = %id, "hub inbox full, unsubscribe dropped");
        }
    }

    /// Non-blocking publish. Drops with a log line if the hub's own inbox is
    /// full — the publisher is never blocked by a slow or stalled hub.
    pub fn publish(&self, article: Article) {
        if self.publish_tx.try_send(article.clone()).is_err() {
            warn!(url = %article.url, "hub publish inbox full, dropping");
        }
    }
}

async fn run_actor(
    add_rx: async_channel::Receiver<(String, async_channel::Sender<Article>)>,
    remove_rx: async_channel::Receiver<String>,
    publish_rx: async_channel::Receiver<Article>,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) {
    let mut subscriptions: HashMap<String, async_channel::Sender<Article>> = HashMap::new();
    info!("hub actor started");

    loop {
        tokio::select! {
            added = add_rx.recv() => {
                match added {
                    Ok((id, tx)) => {
                        info!(id = %id, "subscriber added");
                        subscriptions.insert(id, tx);
                    }
                    Err(_) => break,
                }
            }
            removed = remove_rx.recv() => {
                match removed {
                    Ok(id) => {
                        if let Some(tx) = subscriptions.remove(&id) {
                            tx.close();
                            info!(id = %id, "subscriber removed");
                        }
                    }
                    Err(_) => break,
                }
            }
            published = publish_rx.recv() => {
                match published {
                    Ok(article) => {
                        for (id, tx) in subscriptions.iter() {
                            if tx.try_send(article.clone()).is_err() {
                                warn!(id = %id, url = %article.url, "subscriber channel full, skipping");
                            }
                        }
                    }
                    Err(_) => break,
                }
            }
            _ = shutdown.recv() => break,
        }
    }
    info!("hub actor stopped");
}
