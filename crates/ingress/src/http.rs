use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::warn;

use articlecrawler_core::error::PipelineError;
use articlecrawler_core::types::FetchJob;
use url::Url;

use crate::state::IngressState;

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub url: String,
}

pub fn router(state: IngressState) -> Router {
    Router::new()
        .route("/submit", post(submit))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn submit(
    State(state): State<IngressState>,
    Json(req): Json<SubmitRequest>,
) -> (axum::http::StatusCode, &'static str) {
    use axum::http::StatusCode;

    let Ok(url) = Url::parse(&req.url) else {
        let err = PipelineError::InvalidUrl(req.url.clone());
        warn!(error = %err, "rejecting submit with invalid url");
        return (StatusCode::BAD_REQUEST, "invalid url");
    };

    if state.fetch_tx.try_send(FetchJob { url }).is_err() {
        return (StatusCode::SERVICE_UNAVAILABLE, "busy");
    }

    (StatusCode::OK, "submitted")
}
