//! Store stage: idempotent persistence, fetch-attempt journaling, and
//! publish-on-insert to the Hub.

mod pool;
mod postgres;

pub use pool::spawn_pool;
pub use postgres::PgRepository;

use articlecrawler_core::types::{Article, FetchAttempt, SaveOutcome};
use async_trait::async_trait;

/// Input to a save: everything the enrich stage derived, minus server-assigned
/// fields (id, created_at, updated_at).
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub url: String,
    pub title: String,
    pub body: String,
    pub summary: String,
    pub content_hash: String,
    pub language: String,
    pub read_time_minutes: i32,
}

/// The persistence contract the pipeline depends on. The pipeline only ever
/// talks to this trait, never to sqlx directly — see DESIGN.md.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Dedup-by-content-hash, else upsert-by-url. Returns the row that was
    /// written (or the pre-existing duplicate when `inserted` is false).
    async fn save_article(&self, draft: NewArticle) -> anyhow::Result<SaveOutcome>;
    async fn get_article_by_id(&self, id: i64) -> anyhow::Result<Article>;
    async fn list_articles(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Article>>;
    /// Fire-and-forget: errors are logged internally, never propagated.
    async fn record_fetch_attempt(&self, attempt: FetchAttempt);
}
