use articlecrawler_core::error::PipelineError;
use articlecrawler_core::types::{Article, FetchAttempt, SaveOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::{error, info};

use crate::{NewArticle, Repository};

#[derive(Debug, FromRow)]
struct ArticleRow {
    id: i64,
    url: String,
    title: String,
    body: String,
    summary: String,
    content_hash: String,
    language: String,
    read_time_minutes: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            id: row.id,
            url: row.url,
            title: row.title,
            body: row.body,
            summary: row.summary,
            content_hash: row.content_hash,
            language: row.language,
            read_time_minutes: row.read_time_minutes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL-backed `Repository`. Owns the connection pool and applies the
/// embedded schema migrations once at startup.
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        info!(max_connections, "connected to postgres");
        Ok(Self { pool })
    }

    /// Idempotent `CREATE TABLE IF NOT EXISTS` migrations, run once at
    /// process startup. No external migration framework (out of scope).
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::raw_sql(include_str!("../migrations/001_init.sql"))
            .execute(&self.pool)
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        info!("migrations complete");
        Ok(())
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn save_article(&self, draft: NewArticle) -> anyhow::Result<SaveOutcome> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        let duplicate: Option<ArticleRow> =
            sqlx::query_as("SELECT * FROM articles WHERE content_hash = $1 LIMIT 1")
                .bind(&draft.content_hash)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| PipelineError::Storage(e.to_string()))?;

        if let Some(existing) = duplicate {
            tx.commit()
                .await
                .map_err(|e| PipelineError::Storage(e.to_string()))?;
            return Ok(SaveOutcome {
                inserted: false,
                article: existing.into(),
            });
        }

        let row: ArticleRow = sqlx::query_as(
            r#"
            INSERT INTO articles (url, title, body, summary, content_hash, language, read_time_minutes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, now(), now())
            ON CONFLICT (url) DO UPDATE SET
                title = EXCLUDED.title,
                body = EXCLUDED.body,
                summary = EXCLUDED.summary,
                content_hash = EXCLUDED.content_hash,
                language = EXCLUDED.language,
                read_time_minutes = EXCLUDED.read_time_minutes,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(&draft.url)
        .bind(&draft.title)
        .bind(&draft.body)
        .bind(&draft.summary)
        .bind(&draft.content_hash)
        .bind(&draft.language)
        .bind(draft.read_time_minutes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| PipelineError::Storage(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;

        Ok(SaveOutcome {
            inserted: true,
            article: row.into(),
        })
    }

    async fn get_article_by_id(&self, id: i64) -> anyhow::Result<Article> {
        let row: ArticleRow = sqlx::query_as("SELECT * FROM articles WHERE id = $1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        Ok(row.into())
    }

    async fn list_articles(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<Article>> {
        let rows: Vec<ArticleRow> =
            sqlx::query_as("SELECT * FROM articles ORDER BY created_at DESC LIMIT $1 OFFSET $2")
                .bind(limit)
                .bind(offset)
                .fetch_all(&self.pool)
                .await
                .map_err(|e| PipelineError::Storage(e.to_string()))?;
        Ok(rows.into_iter().map(Article::from).collect())
    }

    async fn record_fetch_attempt(&self, attempt: FetchAttempt) {
        let result = sqlx::query(
            "INSERT INTO fetch_attempts (url, success, response_code, error_text, timestamp) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&attempt.url)
        .bind(attempt.success)
        .bind(attempt.response_code)
        .bind(&attempt.error_text)
        .bind(attempt.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| PipelineError::Storage(e.to_string()));

        if let Err(e) = result {
            error!(url = %attempt.url, error = %e, "failed to record fetch attempt");
        }
    }
}
