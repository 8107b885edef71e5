use std::pin::Pin;

use articlecrawler_core::error::PipelineError;
use articlecrawler_core::types::{Article as CoreArticle, FetchJob};
use articlecrawler_hub::Hub;
use futures_core::Stream;
use tonic::{Request, Response, Status};
use tracing::{info, warn};
use url::Url;

use crate::proto::{
    article_ingestion_server::ArticleIngestion, Article, GetArticleRequest,
    ListArticlesRequest, ListArticlesResponse, StreamNewArticlesRequest, SubmitUrlRequest,
    SubmitUrlResponse,
};
use crate::state::IngressState;

pub struct ArticleIngestionService {
    state: IngressState,
}

impl ArticleIngestionService {
    pub fn new(state: IngressState) -> Self {
        Self { state }
    }
}

/// Ties a subscription's lifetime to its stream future rather than to the
/// loop exiting normally: tonic drops the stream future mid-`await` on
/// client cancel/disconnect, which skips any code lexically after the await
/// point, so cleanup has to live in `Drop` to run in both cases.
struct SubscriptionGuard {
    id: String,
    hub: Hub,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.hub.unsubscribe(self.id.clone());
        info!(id = %self.id, "subscriber disconnected");
    }
}

fn to_proto(article: CoreArticle) -> Article {
    Article {
        id: article.id,
        url: article.url,
        title: article.title,
        body: article.body,
        summary: article.summary,
        content_hash: article.content_hash,
        language: article.language,
        read_time_minutes: article.read_time_minutes,
        created_at: article.created_at.to_rfc3339(),
        updated_at: article.updated_at.to_rfc3339(),
    }
}

#[tonic::async_trait]
impl ArticleIngestion for ArticleIngestionService {
    async fn submit_url(
        &self,
        request: Request<SubmitUrlRequest>,
    ) -> Result<Response<SubmitUrlResponse>, Status> {
        let url_str = request.into_inner().url;
        if url_str.is_empty() {
            return Err(Status::invalid_argument("empty url"));
        }

        let url = Url::parse(&url_str).map_err(|_| {
            Status::invalid_argument(PipelineError::InvalidUrl(url_str.clone()).to_string())
        })?;

        let id = format!("job-{}", now_nanos());
        let job = FetchJob { url };

        if self.state.fetch_tx.try_send(job).is_err() {
            return Ok(Response::new(SubmitUrlResponse {
                id,
                message: "pipeline busy".to_string(),
            }));
        }

        Ok(Response::new(SubmitUrlResponse {
            id,
            message: "submitted".to_string(),
        }))
    }

    type StreamNewArticlesStream =
        Pin<Box<dyn Stream<Item = Result<Article, Status>> + Send + 'static>>;

    async fn stream_new_articles(
        &self,
        _request: Request<StreamNewArticlesRequest>,
    ) -> Result<Response<Self::StreamNewArticlesStream>, Status> {
        let id = format!("sub-{}", now_nanos());
        info!(id = %id, "subscriber connected");
        let rx = self.state.hub.subscribe(id.clone());
        let guard = SubscriptionGuard {
            id,
            hub: self.state.hub.clone(),
        };

        let stream = async_stream::stream! {
            let _guard = guard;
            while let Ok(article) = rx.recv().await {
                yield Ok(to_proto(article));
            }
        };

        Ok(Response::new(Box::pin(stream)))
    }

    async fn get_article(
        &self,
        request: Request<GetArticleRequest>,
    ) -> Result<Response<Article>, Status> {
        let id = request.into_inner().id;
        let article = self
            .state
            .repo
            .get_article_by_id(id)
            .await
            .map_err(|e| Status::not_found(e.to_string()))?;
        Ok(Response::new(to_proto(article)))
    }

    async fn list_articles(
        &self,
        request: Request<ListArticlesRequest>,
    ) -> Result<Response<ListArticlesResponse>, Status> {
        let req = request.into_inner();
        let articles = self
            .state
            .repo
            .list_articles(req.limit as i64, req.offset as i64)
            .await
            .map_err(|e| Status::internal(e.to_string()))?;
        Ok(Response::new(ListArticlesResponse {
            articles: articles.into_iter().map(to_proto).collect(),
        }))
    }
}

fn now_nanos() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_else(|e| {
            warn!("system clock before unix epoch: {e}");
            0
        })
}
