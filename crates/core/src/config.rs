use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pipeline: PipelineConfig,
    pub rate_limit: RateLimitConfig,
    pub database: DatabaseConfig,
    pub backoff: BackoffConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub grpc_addr: String,
    pub http_addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    pub fetch_workers: usize,
    pub parse_workers: usize,
    pub enrich_workers: usize,
    pub store_workers: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    pub default_rps: u32,
    pub burst: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackoffConfig {
    pub base_seconds: u64,
    pub max_retries: u32,
}

impl BackoffConfig {
    pub fn base(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.base_seconds)
    }
}

impl AppConfig {
    /// Apply `ARTICLE_<SECTION>_<FIELD>` environment overrides on top of a
    /// file-loaded config.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("ARTICLE_SERVER_GRPC_ADDR") {
            self.server.grpc_addr = v;
        }
        if let Ok(v) = std::env::var("ARTICLE_SERVER_HTTP_ADDR") {
            self.server.http_addr = v;
        }
        if let Ok(v) = std::env::var("ARTICLE_DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(n) = parse_env_usize("ARTICLE_PIPELINE_FETCH_WORKERS") {
            self.pipeline.fetch_workers = n;
        }
        if let Some(n) = parse_env_usize("ARTICLE_PIPELINE_PARSE_WORKERS") {
            self.pipeline.parse_workers = n;
        }
        if let Some(n) = parse_env_usize("ARTICLE_PIPELINE_ENRICH_WORKERS") {
            self.pipeline.enrich_workers = n;
        }
        if let Some(n) = parse_env_usize("ARTICLE_PIPELINE_STORE_WORKERS") {
            self.pipeline.store_workers = n;
        }
        if let Ok(v) = std::env::var("ARTICLE_RATE_LIMIT_DEFAULT_RPS") {
            if let Ok(n) = v.parse::<u32>() {
                self.rate_limit.default_rps = n;
            }
        }
        if let Ok(v) = std::env::var("ARTICLE_RATE_LIMIT_BURST") {
            if let Ok(n) = v.parse::<u32>() {
                self.rate_limit.burst = n;
            }
        }
        if let Ok(v) = std::env::var("ARTICLE_BACKOFF_MAX_RETRIES") {
            if let Ok(n) = v.parse::<u32>() {
                self.backoff.max_retries = n;
            }
        }
    }
}

fn parse_env_usize(key: &str) -> Option<usize> {
    std::env::var(key)
        .ok()?
        .parse::<usize>()
        .ok()
        .filter(|&n| n > 0)
}
