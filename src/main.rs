mod cli;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

// mimalloc avoids glibc malloc's refusal to release memory back to the OS
// under the pipeline's high-concurrency allocation pattern.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use articlecrawler_core::config::AppConfig;
use articlecrawler_core::error::PipelineError;

use crate::cli::Cli;
use crate::pipeline::Pipeline;

const SHUTDOWN_GRACE_PERIOD: std::time::Duration = std::time::Duration::from_secs(2);

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads())
        .thread_stack_size(8 * 1024 * 1024)
        .max_blocking_threads(512) // headroom for spawn_blocking parse/enrich work
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

fn worker_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

async fn async_main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_str = std::fs::read_to_string(&cli.config).unwrap_or_else(|_| {
        warn!(path = %cli.config, "config file not found, using defaults");
        include_str!("../config/default.toml").to_string()
    });
    let mut config: AppConfig = toml::from_str(&config_str)
        .map_err(|e| PipelineError::Config(e.to_string()))?;
    config.apply_env_overrides();

    let pipeline = Pipeline::start(&config).await?;

    let grpc_addr: std::net::SocketAddr = config.server.grpc_addr.parse().map_err(|e| {
        PipelineError::Config(format!("invalid grpc_addr: {e}"))
    })?;
    let http_addr: std::net::SocketAddr = config.server.http_addr.parse().map_err(|e| {
        PipelineError::Config(format!("invalid http_addr: {e}"))
    })?;
    let ingress_state = articlecrawler_ingress::IngressState {
        fetch_tx: pipeline.fetch_tx.clone(),
        hub: pipeline.hub.clone(),
        repo: pipeline.repo.clone(),
    };

    let grpc_handle = tokio::spawn(articlecrawler_ingress::serve_grpc(
        grpc_addr,
        ingress_state.clone(),
        pipeline.shutdown_tx.subscribe(),
    ));
    let http_handle = tokio::spawn(articlecrawler_ingress::serve_http(
        http_addr,
        ingress_state,
        pipeline.shutdown_tx.subscribe(),
    ));

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received, draining pipeline");

    pipeline.shutdown(SHUTDOWN_GRACE_PERIOD).await;
    let _ = grpc_handle.await;
    let _ = http_handle.await;

    Ok(())
}
