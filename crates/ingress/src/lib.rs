//! Ingress surface: a thin gRPC + HTTP producer into the pipeline and a
//! subscriber drain out of the Hub. No crawling/parsing logic lives here.

mod grpc;
mod http;
mod state;

pub mod proto {
    tonic::include_proto!("articles.v1");
}

pub use grpc::ArticleIngestionService;
pub use state::IngressState;

use proto::article_ingestion_server::ArticleIngestionServer;
use tonic::transport::Server;
use tracing::info;

/// Serve the gRPC surface until the shutdown signal fires.
pub async fn serve_grpc(
    addr: std::net::SocketAddr,
    state: IngressState,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    info!(%addr, "grpc ingress listening");
    let service = ArticleIngestionServer::new(ArticleIngestionService::new(state));
    Server::builder()
        .add_service(service)
        .serve_with_shutdown(addr, async move {
            let _ = shutdown.recv().await;
        })
        .await?;
    Ok(())
}

/// Serve the HTTP surface until the shutdown signal fires.
pub async fn serve_http(
    addr: std::net::SocketAddr,
    state: IngressState,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    info!(%addr, "http ingress listening");
    let router = http::router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await?;
    Ok(())
}
